use super::CustomerId;

/// Cursor-based request for one page of a vendor list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub limit: u8,
    pub starting_after: Option<CustomerId>,
}

#[derive(Debug, Clone)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub has_more: bool,
}
