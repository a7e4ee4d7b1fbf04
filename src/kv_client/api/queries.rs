use serde::Serialize;

/// `?keys`: list category names instead of items.
#[derive(Serialize)]
pub struct KeysQuery {
    pub keys: &'static str,
}

impl Default for KeysQuery {
    fn default() -> Self {
        Self { keys: "" }
    }
}

/// `?recurse&wait=<bound>&index=<N>`: blocking query over one category.
#[derive(Serialize)]
pub struct BlockingQuery {
    pub recurse: &'static str,
    pub wait: String,
    pub index: u64,
}
