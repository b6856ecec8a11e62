pub mod boq;
pub mod department;
pub mod designation;
pub mod offer;
pub mod product;
pub mod request;
pub mod role;
pub mod role_assignment;
pub mod user;

pub const STATUS_DOCUMENT_PENDING: &str = "Pending";
pub const STATUS_DOCUMENT_IN_REVIEW: &str = "In Review";
pub const STATUS_DOCUMENT_APPROVED: &str = "Approved";
pub const STATUS_DOCUMENT_REJECTED: &str = "Rejected";

pub const DOCUMENT_STATUSES: [&str; 4] = [
    STATUS_DOCUMENT_PENDING,
    STATUS_DOCUMENT_IN_REVIEW,
    STATUS_DOCUMENT_APPROVED,
    STATUS_DOCUMENT_REJECTED,
];

/// Matches `value` against the document statuses ignoring case and returns
/// the canonical spelling.
pub fn parse_document_status(value: &str) -> Option<&'static str> {
    let value = value.trim();
    DOCUMENT_STATUSES
        .iter()
        .find(|x| x.eq_ignore_ascii_case(value))
        .copied()
}
