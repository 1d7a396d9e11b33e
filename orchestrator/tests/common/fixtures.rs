//! Test fixtures and data for orchestrator tests

use std::path::Path;
use std::time::Duration;

use serde_json::{json, Value};

use orchestrator::{EnrichStrategy, RunConfig};
use shared::CandidateRecord;

/// A company as the fake registry knows it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeCompany {
    pub inn: String,
    pub name: String,
    pub employees: u64,
    pub okved: String,
    pub region: String,
}

impl FakeCompany {
    pub fn new(inn: &str, employees: u64, okved: &str) -> Self {
        Self {
            inn: inn.to_string(),
            name: format!("ООО Тест {inn}"),
            employees,
            okved: okved.to_string(),
            region: String::new(),
        }
    }

    pub fn in_region(mut self, region: &str) -> Self {
        self.region = region.to_string();
        self
    }

    /// Shape of a `/search` hit: identifier and name only, headcount unknown
    pub fn search_item(&self) -> Value {
        json!({"ЮЛ": {"ИНН": self.inn, "НаимСокрЮЛ": self.name}})
    }

    /// Shape of a `/multinfo` item
    pub fn card_item(&self) -> Value {
        json!({"ЮЛ": {
            "ИНН": self.inn,
            "КолРаб": self.employees.to_string(),
            "ОснВидДеят": {"Код": self.okved},
            "Адрес": {"АдресПолн": self.region},
            "Контакты": format!("8495{}, info@{}.ru", self.inn, self.inn),
            "Финансы": {"Год": "2023", "Выручка": 1500}
        }})
    }

    /// Shape of an `/egr` extract
    pub fn detail_item(&self) -> Value {
        json!({"ЮЛ": {
            "НаимСокрЮЛ": self.name,
            "КолРаб": self.employees,
            "ОснВидДеят": {"Код": self.okved},
            "НомТел": format!("8495{}", self.inn)
        }})
    }
}

/// Standard test data and fixtures
pub struct TestFixtures;

impl TestFixtures {
    pub const API_KEY: &'static str = "test-api-key";
    pub const PAGE_SIZE: usize = 4;
    pub const DEFAULT_TARGET: usize = 50;

    /// Configuration rooted in a temporary directory, without pacing
    pub fn config(dir: &Path) -> RunConfig {
        RunConfig {
            api_key: Self::API_KEY.to_string(),
            base_url: "http://127.0.0.1:9/api".to_string(),
            target_count: Self::DEFAULT_TARGET,
            min_employees: 100,
            max_employees: 500,
            pacing: Duration::ZERO,
            query: "it".to_string(),
            filter: None,
            max_pages: 10,
            batch_size: 25,
            category_prefixes: vec!["62".into(), "63".into(), "58".into()],
            strategy: EnrichStrategy::Batch,
            progress_path: dir.join("data").join("progress.json"),
            output_path: dir.join("data").join("companies.csv"),
        }
    }

    /// Ten companies: six pass the default filter
    pub fn mixed_registry() -> Vec<FakeCompany> {
        vec![
            FakeCompany::new("7700000001", 150, "62.01"),
            FakeCompany::new("7700000002", 50, "62.01"),
            FakeCompany::new("7700000003", 320, "63.11"),
            FakeCompany::new("7700000004", 200, "47.11"),
            FakeCompany::new("7700000005", 100, "58.29"),
            FakeCompany::new("7700000006", 501, "62.02"),
            FakeCompany::new("7700000007", 500, "62.09"),
            FakeCompany::new("7700000008", 0, ""),
            FakeCompany::new("7700000009", 240, "63.99"),
            FakeCompany::new("7700000010", 410, "62.01"),
        ]
    }

    pub fn mixed_registry_accepted() -> Vec<&'static str> {
        vec![
            "7700000001",
            "7700000003",
            "7700000005",
            "7700000007",
            "7700000009",
            "7700000010",
        ]
    }

    /// `count` companies that all pass the default filter
    pub fn acceptable_registry(count: usize) -> Vec<FakeCompany> {
        (1..=count)
            .map(|n| FakeCompany::new(&format!("50{n:08}"), 120 + n as u64, "62.01"))
            .collect()
    }

    /// A row as an earlier run would have finalized it
    pub fn finalized_row(inn: &str) -> CandidateRecord {
        let mut record = CandidateRecord::new(inn, "api-fns/search+multinfo");
        record.name = format!("ООО Ранее {inn}");
        record.employees = 150;
        record.category_code = "62.01".to_string();
        record
    }
}
