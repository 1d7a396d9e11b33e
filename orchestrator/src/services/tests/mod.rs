//! Service-specific tests
//!
//! Each storage service is exercised against a temporary directory.


pub mod common {
    use shared::CandidateRecord;

    /// A finalized-looking row
    pub fn row(identifier: &str, employees: u64, category_code: &str) -> CandidateRecord {
        let mut record = CandidateRecord::new(identifier, "api-fns/search+multinfo");
        record.name = format!("ООО Компания {identifier}");
        record.employees = employees;
        record.category_code = category_code.to_string();
        record
    }
}
