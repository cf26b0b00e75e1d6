use std::collections::HashSet;

/// One address extracted from a tag listing, on its way to the store
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressRecord {
    /// Address identifier; never empty
    pub address: String,

    /// Token or contract name shown next to the address
    pub display_name: Option<String>,

    /// Icon source; absolute once the icon has been attached
    pub icon_url: Option<String>,

    /// Downloaded icon bytes
    pub icon_bytes: Option<Vec<u8>>,

    /// Tags shown for the address, deduplicated in page order
    pub tags: Vec<String>,
}

impl AddressRecord {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            ..Self::default()
        }
    }

    /// Name used for the address directory entry
    ///
    /// Falls back from the display name to the first tag; empty when neither
    /// exists.
    ///
    /// # Example
    ///
    /// ```
    /// use tag_harvester::AddressRecord;
    ///
    /// let mut record = AddressRecord::new("0xabc");
    /// record.tags = vec!["defi".to_string(), "dex".to_string()];
    /// assert_eq!(record.directory_name(), "defi");
    ///
    /// record.display_name = Some("Uniswap".to_string());
    /// assert_eq!(record.directory_name(), "Uniswap");
    /// ```
    pub fn directory_name(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or_else(|| self.tags.first().map(String::as_str))
            .unwrap_or("")
    }
}

/// Trims tag texts and drops empties and repeats, keeping first-seen order
pub fn normalize_tags<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut tags = Vec::new();
    for tag in raw {
        let tag = tag.as_ref().trim();
        if !tag.is_empty() && seen.insert(tag.to_string()) {
            tags.push(tag.to_string());
        }
    }
    tags
}
