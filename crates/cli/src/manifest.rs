//! The YAML import manifest.

use anyhow::{bail, Context, Result};
use indexmap::IndexMap;
use rowcast_core::{
    AssetCatalog, AssetDefinition, CustomType, EnumType, FieldDef, RecordType, TypeRegistry,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Enums, custom types, record types and assets for one import run.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default)]
    pub enums: IndexMap<String, EnumSpec>,
    #[serde(default)]
    pub types: IndexMap<String, TypeSpec>,
    /// Record name to field name to declared type.
    #[serde(default)]
    pub records: IndexMap<String, IndexMap<String, String>>,
    #[serde(default)]
    pub assets: Vec<AssetSpec>,
}

/// Enum members, either numbered from zero or with explicit values.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum EnumSpec {
    Ordinal(Vec<String>),
    Valued(IndexMap<String, i64>),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TypeKind {
    #[default]
    Object,
    Value,
    Abstract,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypeSpec {
    #[serde(default)]
    pub kind: TypeKind,
    #[serde(default)]
    pub fields: IndexMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetSpec {
    pub name: String,
    pub excel_name: Option<String>,
    pub output: Option<PathBuf>,
    #[serde(default)]
    pub log_on_import: bool,
    /// Sheet name to record name; `~` infers the record from the type row.
    #[serde(default)]
    pub sheets: IndexMap<String, Option<String>>,
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read manifest: {}", path.display()))?;
        Self::from_yaml(&content).with_context(|| format!("Invalid manifest: {}", path.display()))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Build the type registry: built-ins, then enums, then custom types in
    /// declaration order. A custom type may only refer to types declared
    /// before it.
    pub fn registry(&self) -> Result<TypeRegistry> {
        let mut registry = TypeRegistry::new();

        for (name, spec) in &self.enums {
            let enum_type = match spec {
                EnumSpec::Ordinal(members) => EnumType::new(name.as_str(), members.iter().cloned()),
                EnumSpec::Valued(members) => EnumType::with_values(
                    name.as_str(),
                    members.iter().map(|(m, v)| (m.clone(), *v)),
                ),
            };
            registry.register_enum(enum_type)?;
        }

        for (name, spec) in &self.types {
            let fields = resolve_fields(&registry, &spec.fields)
                .with_context(|| format!("In type '{name}'"))?;
            let custom = match spec.kind {
                TypeKind::Object => CustomType::object(name.as_str(), fields),
                TypeKind::Value => CustomType::value(name.as_str(), fields),
                TypeKind::Abstract => {
                    if !fields.is_empty() {
                        bail!("Abstract type '{name}' cannot declare fields");
                    }
                    CustomType::abstract_type(name.as_str())
                }
            };
            registry.register_custom(custom)?;
        }

        Ok(registry)
    }

    /// Resolve every record declaration against `registry`.
    pub fn record_types(&self, registry: &TypeRegistry) -> Result<IndexMap<String, RecordType>> {
        self.records
            .iter()
            .map(|(name, fields)| {
                let fields = resolve_fields(registry, fields)
                    .with_context(|| format!("In record '{name}'"))?;
                let record_type = RecordType {
                    name: name.clone(),
                    fields,
                };
                Ok((name.clone(), record_type))
            })
            .collect()
    }

    /// Build the asset catalog, binding sheets to the declared records.
    pub fn catalog(&self, registry: &TypeRegistry) -> Result<AssetCatalog> {
        let record_types = self.record_types(registry)?;
        let mut catalog = AssetCatalog::new();

        for spec in &self.assets {
            let mut asset =
                AssetDefinition::new(spec.name.as_str()).with_log_on_import(spec.log_on_import);
            asset.excel_name.clone_from(&spec.excel_name);
            asset.output.clone_from(&spec.output);

            for (sheet, record) in &spec.sheets {
                asset = match record {
                    Some(record) => {
                        let record_type = record_types.get(record).with_context(|| {
                            format!("Asset '{}': record type not found: {record}", spec.name)
                        })?;
                        asset.bind(sheet.as_str(), record_type.clone())
                    }
                    None => asset.bind_inferred(sheet.as_str()),
                };
            }

            if catalog.add(asset).is_some() {
                bail!("Asset '{}' reuses the workbook of an earlier asset", spec.name);
            }
        }

        Ok(catalog)
    }
}

fn resolve_fields(
    registry: &TypeRegistry,
    fields: &IndexMap<String, String>,
) -> Result<Vec<FieldDef>> {
    fields
        .iter()
        .map(|(name, token)| {
            let ty = registry
                .resolve(token)
                .with_context(|| format!("Field '{name}'"))?;
            Ok(FieldDef::new(name.as_str(), ty))
        })
        .collect()
}
