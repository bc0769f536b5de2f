use serde::{Deserialize, Serialize};

use crate::domain::{AccountRecord, MethodSet};

/// Request to score one account.
#[derive(Debug, Serialize, Deserialize)]
pub struct DetectRequest {
    /// Raw account snapshot
    pub account: AccountRecord,

    /// Methods to run ("rules", "ml"); all enabled methods if omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

impl DetectRequest {
    pub fn methods(&self) -> MethodSet {
        requested_methods(self.methods.as_deref())
    }
}

/// Request to score many accounts.
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchDetectRequest {
    pub accounts: Vec<AccountRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub methods: Option<Vec<String>>,
}

impl BatchDetectRequest {
    pub fn methods(&self) -> MethodSet {
        requested_methods(self.methods.as_deref())
    }
}

/// Request carrying one account, for inspection endpoints.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountRequest {
    pub account: AccountRecord,
}

fn requested_methods(names: Option<&[String]>) -> MethodSet {
    match names {
        Some(names) => MethodSet::from_names(names.iter().map(String::as_str)),
        None => MethodSet::ALL,
    }
}
