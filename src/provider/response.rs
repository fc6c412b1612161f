use crate::foundation::error::{DepthliftError, DepthliftResult};

/// Response shape returned by the depth-estimation service.
///
/// The service is opaque to this crate; only the fields below are consumed.
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ProviderResponse {
    /// Whether processing succeeded.
    pub success: bool,
    /// Failure message; present iff `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Reference to the full source image (mesh texture).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Rows of normalized depth samples; present when the response is mesh-capable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depth_data: Option<Vec<Vec<f32>>>,
    /// Source image width in pixels.
    #[serde(default)]
    pub width: u32,
    /// Source image height in pixels.
    #[serde(default)]
    pub height: u32,
    /// Provider hint that the mesh strategy should be used.
    #[serde(default)]
    pub use_mesh: bool,
    /// Discrete depth layers for the flat strategy.
    #[serde(default)]
    pub layers: Vec<LayerPayload>,
}

/// One flat layer as delivered by the provider.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayerPayload {
    /// Image reference (`data:` URL or relative path).
    pub data: String,
    /// Layer depth in `[0, 1]` (`1` = nearest).
    pub depth: f64,
    /// Human-readable layer name.
    #[serde(default)]
    pub name: String,
    /// Display order; lower is further back.
    pub index: i64,
}

impl ProviderResponse {
    /// Parse a response from JSON bytes.
    pub fn from_json(bytes: &[u8]) -> DepthliftResult<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| DepthliftError::provider(format!("unreadable provider response: {e}")))
    }

    /// Turn a non-success response into [`DepthliftError::Provider`].
    pub fn into_result(self) -> DepthliftResult<Self> {
        if self.success {
            return Ok(self);
        }
        let msg = self
            .error
            .unwrap_or_else(|| "provider reported failure without a message".to_string());
        Err(DepthliftError::provider(msg))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/provider/response.rs"]
mod tests;
