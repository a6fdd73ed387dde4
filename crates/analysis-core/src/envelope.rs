use serde::{Deserialize, Serialize};

/// Uniform result wrapper produced by every agent.
///
/// A failed agent still yields a well-formed envelope: empty data, zero
/// confidence and an error message. Downstream consumers treat such an
/// envelope as a low-information input rather than a hard failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEnvelope<T> {
    pub agent: String,
    pub data: Option<T>,
    pub insight: String,
    pub confidence: f64,
    pub status: AgentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Success,
    Error,
}

impl<T> AgentEnvelope<T> {
    pub fn success(agent: &str, data: T, insight: String, confidence: f64) -> Self {
        Self {
            agent: agent.to_string(),
            data: Some(data),
            insight,
            confidence,
            status: AgentStatus::Success,
            error: None,
        }
    }

    pub fn failure(agent: &str, error: impl std::fmt::Display) -> Self {
        Self {
            agent: agent.to_string(),
            data: None,
            insight: String::new(),
            confidence: 0.0,
            status: AgentStatus::Error,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == AgentStatus::Success
    }

    pub fn is_error(&self) -> bool {
        self.status == AgentStatus::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_envelope_shape() {
        let envelope: AgentEnvelope<()> = AgentEnvelope::failure("Technical Analyst", "boom");
        assert!(envelope.is_error());
        assert!(envelope.data.is_none());
        assert_eq!(envelope.confidence, 0.0);
        assert_eq!(envelope.error.as_deref(), Some("boom"));
    }

    #[test]
    fn status_serializes_lowercase() {
        let envelope = AgentEnvelope::success("Market Data Agent", 1u32, "ok".into(), 0.85);
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["status"], "success");
        assert!(json.get("error").is_none());
    }
}
