//! Record model and field vocabulary
//!
//! A [`Record`] is one catalogued scale model. The 17 descriptive fields are
//! listed once, in display order, by [`Field::ALL`]; every other component
//! goes through that list instead of naming columns itself.
//!
//! Records serialize with the spreadsheet column labels as keys, so the JSON
//! stored in the persistence slot and carried inside sync codes matches the
//! column headers users import from.

use serde::{Deserialize, Serialize};

use crate::placeholder::{PlaceholderImages, CARD_SIZE};

/// One of the 17 descriptive fields of a record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    #[serde(rename = "Anno")]
    Year,
    #[serde(rename = "Marca della macchina")]
    CarBrand,
    #[serde(rename = "Modello")]
    ModelName,
    #[serde(rename = "Colore")]
    Color,
    #[serde(rename = "Tipo")]
    Kind,
    #[serde(rename = "Piloti")]
    Drivers,
    #[serde(rename = "Materiale")]
    Material,
    #[serde(rename = "Marca dello modellino")]
    MakerBrand,
    #[serde(rename = "Numero")]
    Number,
    #[serde(rename = "Pilota")]
    Pilot,
    #[serde(rename = "Tema")]
    Theme,
    #[serde(rename = "Colezione")]
    CollectionGroup,
    #[serde(rename = "Fascicolo")]
    Issue,
    #[serde(rename = "Codice")]
    Code,
    #[serde(rename = "Scala")]
    Scale,
    #[serde(rename = "Stato")]
    Status,
    #[serde(rename = "Osservazione")]
    Remark,
}

impl Field {
    /// All fields in display order
    pub const ALL: [Field; 17] = [
        Field::Year,
        Field::CarBrand,
        Field::ModelName,
        Field::Color,
        Field::Kind,
        Field::Drivers,
        Field::Material,
        Field::MakerBrand,
        Field::Number,
        Field::Pilot,
        Field::Theme,
        Field::CollectionGroup,
        Field::Issue,
        Field::Code,
        Field::Scale,
        Field::Status,
        Field::Remark,
    ];

    /// Fields offered on the statistics landing page
    pub const REPORT_CATEGORIES: [Field; 9] = [
        Field::Year,
        Field::CarBrand,
        Field::ModelName,
        Field::Color,
        Field::Kind,
        Field::Drivers,
        Field::MakerBrand,
        Field::CollectionGroup,
        Field::Status,
    ];

    /// Spreadsheet column label (also the JSON key)
    pub const fn label(self) -> &'static str {
        match self {
            Field::Year => "Anno",
            Field::CarBrand => "Marca della macchina",
            Field::ModelName => "Modello",
            Field::Color => "Colore",
            Field::Kind => "Tipo",
            Field::Drivers => "Piloti",
            Field::Material => "Materiale",
            Field::MakerBrand => "Marca dello modellino",
            Field::Number => "Numero",
            Field::Pilot => "Pilota",
            Field::Theme => "Tema",
            Field::CollectionGroup => "Colezione",
            Field::Issue => "Fascicolo",
            Field::Code => "Codice",
            Field::Scale => "Scala",
            Field::Status => "Stato",
            Field::Remark => "Osservazione",
        }
    }

    /// ASCII identifier used in URLs (`/api/stats/car_brand`)
    pub const fn key(self) -> &'static str {
        match self {
            Field::Year => "year",
            Field::CarBrand => "car_brand",
            Field::ModelName => "model_name",
            Field::Color => "color",
            Field::Kind => "kind",
            Field::Drivers => "drivers",
            Field::Material => "material",
            Field::MakerBrand => "maker_brand",
            Field::Number => "number",
            Field::Pilot => "pilot",
            Field::Theme => "theme",
            Field::CollectionGroup => "collection_group",
            Field::Issue => "issue",
            Field::Code => "code",
            Field::Scale => "scale",
            Field::Status => "status",
            Field::Remark => "remark",
        }
    }

    /// Resolve a field from either its column label or its key.
    ///
    /// Surrounding whitespace is ignored; matching is otherwise exact.
    pub fn parse(name: &str) -> Option<Field> {
        let name = name.trim();
        Field::ALL
            .into_iter()
            .find(|f| f.label() == name || f.key() == name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One catalogued scale model
///
/// Field values are always text; the empty string means "not set".
/// Only `image_url` changes after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: String,
    #[serde(rename = "Anno", default)]
    pub year: String,
    #[serde(rename = "Marca della macchina", default)]
    pub car_brand: String,
    #[serde(rename = "Modello", default)]
    pub model_name: String,
    #[serde(rename = "Colore", default)]
    pub color: String,
    #[serde(rename = "Tipo", default)]
    pub kind: String,
    #[serde(rename = "Piloti", default)]
    pub drivers: String,
    #[serde(rename = "Materiale", default)]
    pub material: String,
    #[serde(rename = "Marca dello modellino", default)]
    pub maker_brand: String,
    #[serde(rename = "Numero", default)]
    pub number: String,
    #[serde(rename = "Pilota", default)]
    pub pilot: String,
    #[serde(rename = "Tema", default)]
    pub theme: String,
    #[serde(rename = "Colezione", default)]
    pub collection_group: String,
    #[serde(rename = "Fascicolo", default)]
    pub issue: String,
    #[serde(rename = "Codice", default)]
    pub code: String,
    #[serde(rename = "Scala", default)]
    pub scale: String,
    #[serde(rename = "Stato", default)]
    pub status: String,
    #[serde(rename = "Osservazione", default)]
    pub remark: String,
    /// Absent means "use the id-seeded placeholder"
    #[serde(rename = "imageUrl", default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl Record {
    /// Create a record with every field unset
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            year: String::new(),
            car_brand: String::new(),
            model_name: String::new(),
            color: String::new(),
            kind: String::new(),
            drivers: String::new(),
            material: String::new(),
            maker_brand: String::new(),
            number: String::new(),
            pilot: String::new(),
            theme: String::new(),
            collection_group: String::new(),
            issue: String::new(),
            code: String::new(),
            scale: String::new(),
            status: String::new(),
            remark: String::new(),
            image_url: None,
        }
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Year => &self.year,
            Field::CarBrand => &self.car_brand,
            Field::ModelName => &self.model_name,
            Field::Color => &self.color,
            Field::Kind => &self.kind,
            Field::Drivers => &self.drivers,
            Field::Material => &self.material,
            Field::MakerBrand => &self.maker_brand,
            Field::Number => &self.number,
            Field::Pilot => &self.pilot,
            Field::Theme => &self.theme,
            Field::CollectionGroup => &self.collection_group,
            Field::Issue => &self.issue,
            Field::Code => &self.code,
            Field::Scale => &self.scale,
            Field::Status => &self.status,
            Field::Remark => &self.remark,
        }
    }

    fn slot_mut(&mut self, field: Field) -> &mut String {
        match field {
            Field::Year => &mut self.year,
            Field::CarBrand => &mut self.car_brand,
            Field::ModelName => &mut self.model_name,
            Field::Color => &mut self.color,
            Field::Kind => &mut self.kind,
            Field::Drivers => &mut self.drivers,
            Field::Material => &mut self.material,
            Field::MakerBrand => &mut self.maker_brand,
            Field::Number => &mut self.number,
            Field::Pilot => &mut self.pilot,
            Field::Theme => &mut self.theme,
            Field::CollectionGroup => &mut self.collection_group,
            Field::Issue => &mut self.issue,
            Field::Code => &mut self.code,
            Field::Scale => &mut self.scale,
            Field::Status => &mut self.status,
            Field::Remark => &mut self.remark,
        }
    }

    /// Builder-style setter used while a record is being created.
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        *self.slot_mut(field) = value.into();
        self
    }

    /// Iterate `(field, value)` pairs in display order
    pub fn fields(&self) -> impl Iterator<Item = (Field, &str)> + '_ {
        Field::ALL.into_iter().map(move |f| (f, self.get(f)))
    }

    /// Image to display: the stored URL, else a placeholder seeded by the id
    pub fn display_image_url(&self, placeholders: &PlaceholderImages) -> String {
        match &self.image_url {
            Some(url) if !url.is_empty() => url.clone(),
            _ => placeholders.url(&self.id, CARD_SIZE),
        }
    }
}
