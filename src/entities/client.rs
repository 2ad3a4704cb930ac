// 👥 Client Entity - who requests work, and how urgently

use super::{EntityKind, FieldShape, Record};
use serde::{Deserialize, Serialize};

/// Free-form attribute payload as it arrives from ingestion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Attributes {
    /// Raw text that should contain JSON
    Text(String),
    /// Already-structured value
    Structured(serde_json::Value),
}

impl Attributes {
    /// The payload survives a structured-data round trip
    pub fn is_well_formed(&self) -> bool {
        match self {
            Attributes::Text(text) => serde_json::from_str::<serde_json::Value>(text).is_ok(),
            Attributes::Structured(_) => true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    #[serde(rename = "ClientID", skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    #[serde(rename = "ClientName", skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,

    /// 1 (lowest) to 5 (highest)
    #[serde(rename = "PriorityLevel", skip_serializing_if = "Option::is_none")]
    pub priority_level: Option<f64>,

    #[serde(rename = "RequestedTaskIDs", skip_serializing_if = "Option::is_none")]
    pub requested_task_ids: Option<Vec<String>>,

    #[serde(rename = "GroupTag", skip_serializing_if = "Option::is_none")]
    pub group_tag: Option<String>,

    #[serde(rename = "AttributesJSON", skip_serializing_if = "Option::is_none")]
    pub attributes_json: Option<Attributes>,
}

impl Record for Client {
    const KIND: EntityKind = EntityKind::Clients;
    const FIELDS: &'static [(&'static str, FieldShape)] = &[
        ("ClientID", FieldShape::Text),
        ("ClientName", FieldShape::Text),
        ("PriorityLevel", FieldShape::Number),
        ("RequestedTaskIDs", FieldShape::TextList),
        ("GroupTag", FieldShape::Text),
        ("AttributesJSON", FieldShape::Structured),
    ];

    fn id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }

    fn present_fields(&self) -> Vec<&'static str> {
        let present = [
            self.client_id.is_some(),
            self.client_name.is_some(),
            self.priority_level.is_some(),
            self.requested_task_ids.is_some(),
            self.group_tag.is_some(),
            self.attributes_json.is_some(),
        ];
        Self::FIELDS
            .iter()
            .zip(present)
            .filter(|(_, is_present)| *is_present)
            .map(|((name, _), _)| *name)
            .collect()
    }
}
