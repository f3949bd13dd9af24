use serde::Serialize;

#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    Ok,
    Error,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ItemResult {
    pub alias: String,
    pub status: ItemStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl ItemResult {
    pub fn ok(alias: String) -> Self {
        Self { alias, status: ItemStatus::Ok, message: None }
    }

    pub fn error(alias: String, message: String) -> Self {
        Self { alias, status: ItemStatus::Error, message: Some(message) }
    }
}

/// Reply to a batch post. `results` follows input order.
#[derive(Debug, Serialize, Default)]
pub struct BatchSummary {
    pub received: usize,
    pub ok: usize,
    pub fail: usize,
    pub results: Vec<ItemResult>,
}

impl BatchSummary {
    pub fn push(&mut self, result: ItemResult) {
        match result.status {
            ItemStatus::Ok => self.ok += 1,
            ItemStatus::Error => self.fail += 1,
        }
        self.received += 1;
        self.results.push(result);
    }
}
