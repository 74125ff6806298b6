use serde::{Deserialize, Serialize};

/// A department as published by the course-data source. The wire field
/// names (`deptCode`/`deptName`) are the upstream's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Department {
    #[serde(rename = "deptCode")]
    pub(crate) code: String,
    #[serde(rename = "deptName")]
    pub(crate) name: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct DepartmentListResponse {
    pub(crate) data: Vec<Department>,
}
