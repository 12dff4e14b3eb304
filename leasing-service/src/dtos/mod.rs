pub mod documents;

pub use documents::{
    check_line_budget, AppendLineRequest, AppendLineResponse, DocumentResponse, EditLineRequest,
    RecalculateRequest, RemoveLineRequest, RemoveLineResponse, SeedUnitRequest, SeedUnitResponse,
};
