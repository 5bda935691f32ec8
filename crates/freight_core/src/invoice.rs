use serde::Serialize;

/// Address block of an NF-e party. Missing fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Party {
    pub name: String,
    pub tax_id: String,
    pub postal_code: String,
    pub city: String,
    pub state: String,
}

/// The handful of NF-e fields used to prefill a pickup request.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct NfeData {
    pub number: String,
    pub series: String,
    pub issued_at: String,
    pub total_value: String,
    pub origin: Party,
    pub destination: Party,
}

impl NfeData {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
