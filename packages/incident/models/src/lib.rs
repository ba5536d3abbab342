#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record shape and categorical dimension definitions.
//!
//! An [`IncidentRecord`] is one tallied observation: a number of cases that
//! share a year, an occurrence classification and a handful of demographic
//! attributes. The wire format uses the Portuguese keys of the upstream
//! collection, so every field is renamed explicitly.

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Wire key of the additive measure.
pub const CASE_COUNT_KEY: &str = "Suma de Quantidade_de_Casos";

/// Literal occurrence label used for feminicide records.
pub const FEMINICIDE_LABEL: &str = "Feminicídio";

/// Lowercase stem matched by the substring feminicide tests.
pub const FEMINICIDE_STEM: &str = "feminic";

/// Occurrence labels counted as sexual crimes.
pub const SEXUAL_CRIME_LABELS: &[&str] = &["Estupro", "Assédio Sexual", "Importunação Sexual"];

/// Value of [`IncidentRecord::sex`] for female victims.
pub const FEMALE_SEX_LABEL: &str = "Mulher";

/// One row of the incident collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Upstream document identifier.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Number of cases this row represents. Missing, `null` and negative
    /// values are read as zero.
    #[serde(
        rename = "Suma de Quantidade_de_Casos",
        default,
        deserialize_with = "deserialize_case_count"
    )]
    pub case_count: f64,
    /// Calendar year of occurrence.
    #[serde(
        rename = "ano",
        default,
        deserialize_with = "deserialize_year",
        skip_serializing_if = "Option::is_none"
    )]
    pub year: Option<i32>,
    /// Primary classification (e.g. "Feminicídio", "Estupro").
    #[serde(rename = "ocorrencia", default)]
    pub occurrence_type: Option<String>,
    /// Secondary classification.
    #[serde(rename = "tipo_de_violencia", default)]
    pub violence_type: Option<String>,
    /// Victim age band (e.g. "18-25").
    #[serde(rename = "faixa_etaria", default)]
    pub age_group: Option<String>,
    /// Victim ethnicity.
    #[serde(rename = "raca", default)]
    pub ethnicity: Option<String>,
    /// Weapon used.
    #[serde(rename = "arma", default)]
    pub weapon: Option<String>,
    /// State name.
    #[serde(rename = "estado", default)]
    pub state: Option<String>,
    /// Victim sex.
    #[serde(rename = "sexo", default)]
    pub sex: Option<String>,
    /// Country name.
    #[serde(rename = "pais", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    /// Upstream dataset label.
    #[serde(
        rename = "tipo_base_de_dados",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub dataset_kind: Option<String>,
    /// IBGE state code.
    #[serde(rename = "cod_estado", default, skip_serializing_if = "Option::is_none")]
    pub state_code: Option<i64>,
    /// Any other fields present on the wire. Never read by the engine.
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

impl IncidentRecord {
    /// Returns the value of a categorical dimension, treating empty strings
    /// as absent. The year is rendered as its decimal string.
    #[must_use]
    pub fn value_of(&self, dimension: Dimension) -> Option<String> {
        match dimension {
            Dimension::Year => self.year.map(|y| y.to_string()),
            _ => self.text_of(dimension).map(str::to_string),
        }
    }

    /// Borrowing variant of [`Self::value_of`] for the string dimensions.
    /// Always `None` for [`Dimension::Year`].
    #[must_use]
    pub fn text_of(&self, dimension: Dimension) -> Option<&str> {
        let field = match dimension {
            Dimension::OccurrenceType => &self.occurrence_type,
            Dimension::ViolenceType => &self.violence_type,
            Dimension::AgeGroup => &self.age_group,
            Dimension::Ethnicity => &self.ethnicity,
            Dimension::Weapon => &self.weapon,
            Dimension::State => &self.state,
            Dimension::Sex => &self.sex,
            Dimension::Year => return None,
        };
        field.as_deref().filter(|s| !s.is_empty())
    }

    /// Returns the grouping key for `dimension`, falling back to the
    /// dimension's sentinel label when the field is absent.
    #[must_use]
    pub fn key_of(&self, dimension: Dimension) -> String {
        self.value_of(dimension)
            .unwrap_or_else(|| dimension.fallback_label().to_string())
    }

    /// Whether the occurrence is exactly the feminicide label.
    #[must_use]
    pub fn is_feminicide_exact(&self) -> bool {
        self.occurrence_type.as_deref() == Some(FEMINICIDE_LABEL)
    }

    /// Whether the chosen classification contains the feminicide stem,
    /// ignoring case.
    #[must_use]
    pub fn mentions_feminicide(&self, axis: ClassificationAxis) -> bool {
        self.classification(axis)
            .is_some_and(|s| s.to_lowercase().contains(FEMINICIDE_STEM))
    }

    /// Returns the raw classification on the given axis.
    #[must_use]
    pub fn classification(&self, axis: ClassificationAxis) -> Option<&str> {
        match axis {
            ClassificationAxis::Occurrence => self.occurrence_type.as_deref(),
            ClassificationAxis::ViolenceType => self.violence_type.as_deref(),
        }
    }

    /// Whether the occurrence is one of [`SEXUAL_CRIME_LABELS`].
    #[must_use]
    pub fn is_sexual_crime(&self) -> bool {
        self.occurrence_type
            .as_deref()
            .is_some_and(|o| SEXUAL_CRIME_LABELS.contains(&o))
    }

    /// Whether the victim is recorded as female.
    #[must_use]
    pub fn is_female(&self) -> bool {
        self.sex.as_deref() == Some(FEMALE_SEX_LABEL)
    }
}

/// Categorical fields usable as grouping keys.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum Dimension {
    /// Primary classification (`ocorrencia`).
    OccurrenceType,
    /// Secondary classification (`tipo_de_violencia`).
    ViolenceType,
    /// Calendar year (`ano`).
    Year,
    /// Victim age band (`faixa_etaria`).
    AgeGroup,
    /// Victim ethnicity (`raca`).
    Ethnicity,
    /// Weapon used (`arma`).
    Weapon,
    /// State name (`estado`).
    State,
    /// Victim sex (`sexo`).
    Sex,
}

impl Dimension {
    /// Returns the label that absent values are grouped under.
    #[must_use]
    pub const fn fallback_label(self) -> &'static str {
        match self {
            Self::OccurrenceType | Self::ViolenceType => "Outros",
            Self::Year | Self::AgeGroup | Self::State | Self::Sex => "Desconhecido",
            Self::Ethnicity => "Desconhecida",
            Self::Weapon => "Não Especificado",
        }
    }

    /// Returns the upstream wire key of this field.
    #[must_use]
    pub const fn wire_key(self) -> &'static str {
        match self {
            Self::OccurrenceType => "ocorrencia",
            Self::ViolenceType => "tipo_de_violencia",
            Self::Year => "ano",
            Self::AgeGroup => "faixa_etaria",
            Self::Ethnicity => "raca",
            Self::Weapon => "arma",
            Self::State => "estado",
            Self::Sex => "sexo",
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[
            Self::OccurrenceType,
            Self::ViolenceType,
            Self::Year,
            Self::AgeGroup,
            Self::Ethnicity,
            Self::Weapon,
            Self::State,
            Self::Sex,
        ]
    }
}

/// The two classification fields of a record. The upstream data codes
/// feminicide inconsistently between them, so callers pick explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationAxis {
    /// The `ocorrencia` field.
    Occurrence,
    /// The `tipo_de_violencia` field.
    ViolenceType,
}

fn deserialize_case_count<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f64>::deserialize(deserializer)?.unwrap_or(0.0);
    Ok(if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    })
}

/// Accepts integer, float or numeric-string years. Anything else reads as
/// absent.
fn deserialize_year<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(n)) => n
            .as_i64()
            .and_then(|v| i32::try_from(v).ok())
            .or_else(|| {
                n.as_f64().and_then(|f| {
                    #[allow(clippy::cast_possible_truncation)]
                    let truncated = f as i32;
                    (f.fract().abs() < f64::EPSILON).then_some(truncated)
                })
            }),
        Some(serde_json::Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|y| *y != 0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_wire_keys() {
        let record: IncidentRecord = serde_json::from_value(serde_json::json!({
            "_id": "abc",
            "ano": 2022,
            "ocorrencia": "Feminicídio",
            "tipo_de_violencia": "Física",
            "faixa_etaria": "26-35",
            "raca": "Parda",
            "arma": "Arma Branca",
            "estado": "Pernambuco",
            "sexo": "Mulher",
            "cod_estado": 26,
            "Suma de Quantidade_de_Casos": 12,
            "municipio": "Recife"
        }))
        .unwrap();

        assert_eq!(record.id.as_deref(), Some("abc"));
        assert_eq!(record.year, Some(2022));
        assert!((record.case_count - 12.0).abs() < f64::EPSILON);
        assert_eq!(record.state_code, Some(26));
        assert!(record.is_feminicide_exact());
        assert!(record.is_female());
        assert_eq!(
            record.extra.get("municipio"),
            Some(&serde_json::json!("Recife"))
        );
    }

    #[test]
    fn missing_measure_reads_as_zero() {
        let record: IncidentRecord =
            serde_json::from_value(serde_json::json!({ "ocorrencia": "Estupro" })).unwrap();
        assert!(record.case_count.abs() < f64::EPSILON);

        let record: IncidentRecord = serde_json::from_value(serde_json::json!({
            "Suma de Quantidade_de_Casos": null
        }))
        .unwrap();
        assert!(record.case_count.abs() < f64::EPSILON);
    }

    #[test]
    fn year_accepts_strings_and_floats() {
        let record: IncidentRecord =
            serde_json::from_value(serde_json::json!({ "ano": "2021" })).unwrap();
        assert_eq!(record.year, Some(2021));

        let record: IncidentRecord =
            serde_json::from_value(serde_json::json!({ "ano": 2020.0 })).unwrap();
        assert_eq!(record.year, Some(2020));

        let record: IncidentRecord =
            serde_json::from_value(serde_json::json!({ "ano": "n/a" })).unwrap();
        assert_eq!(record.year, None);
    }

    #[test]
    fn empty_strings_fall_back_to_sentinel() {
        let record = IncidentRecord {
            ethnicity: Some(String::new()),
            ..IncidentRecord::default()
        };
        assert_eq!(record.key_of(Dimension::Ethnicity), "Desconhecida");
        assert_eq!(record.key_of(Dimension::Weapon), "Não Especificado");
        assert_eq!(record.key_of(Dimension::OccurrenceType), "Outros");
    }

    #[test]
    fn feminicide_substring_ignores_case() {
        let record = IncidentRecord {
            violence_type: Some("FEMINICÍDIO TENTADO".to_string()),
            ..IncidentRecord::default()
        };
        assert!(record.mentions_feminicide(ClassificationAxis::ViolenceType));
        assert!(!record.mentions_feminicide(ClassificationAxis::Occurrence));
    }

    #[test]
    fn dimension_parses_kebab_case() {
        assert_eq!("age-group".parse::<Dimension>().unwrap(), Dimension::AgeGroup);
        assert_eq!("Weapon".parse::<Dimension>().unwrap(), Dimension::Weapon);
        assert_eq!(Dimension::ViolenceType.to_string(), "violence-type");
        assert!("city".parse::<Dimension>().is_err());
    }
}
