use crate::errors::CadenceResult;

/// Client → industry-segment lookup, used by the resolver's industry tier.
pub trait IClientDirectory: Send + Sync {
    fn industry_segment(&self, client_id: &str) -> CadenceResult<Option<String>>;
}
