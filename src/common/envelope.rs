// Uniform result envelope returned by every operation

use serde::de::{self, Deserializer};
use serde::ser::{SerializeStruct, Serializer};
use serde::{Deserialize, Serialize};

/// Outcome of one server-side operation.
///
/// Every handler returns this instead of letting an error escape: callers
/// branch on the success flag and never see a transport-level fault. The
/// failure variant structurally cannot carry a payload.
///
/// # JSON shape
/// ```json
/// { "is_success": true,  "message": "Profile created", "data": { ... } }
/// { "is_success": false, "message": "Email already in use" }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ActionState<T> {
    Success { message: String, data: T },
    Failure { message: String },
}

impl<T> ActionState<T> {
    pub fn success(message: impl Into<String>, data: T) -> Self {
        ActionState::Success {
            message: message.into(),
            data,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ActionState::Failure {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, ActionState::Success { .. })
    }

    pub fn message(&self) -> &str {
        match self {
            ActionState::Success { message, .. } => message,
            ActionState::Failure { message } => message,
        }
    }

    /// Consumes the envelope, yielding the payload if it was a success.
    pub fn into_data(self) -> Option<T> {
        match self {
            ActionState::Success { data, .. } => Some(data),
            ActionState::Failure { .. } => None,
        }
    }
}

impl<T: Serialize> Serialize for ActionState<T> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            ActionState::Success { message, data } => {
                let mut s = serializer.serialize_struct("ActionState", 3)?;
                s.serialize_field("is_success", &true)?;
                s.serialize_field("message", message)?;
                s.serialize_field("data", data)?;
                s.end()
            }
            ActionState::Failure { message } => {
                // The data field is omitted entirely, not serialized as null
                let mut s = serializer.serialize_struct("ActionState", 2)?;
                s.serialize_field("is_success", &false)?;
                s.serialize_field("message", message)?;
                s.end()
            }
        }
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for ActionState<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw<T> {
            is_success: bool,
            message: String,
            #[serde(default = "Option::default")]
            data: Option<T>,
        }

        let raw = Raw::<T>::deserialize(deserializer)?;
        match (raw.is_success, raw.data) {
            (true, Some(data)) => Ok(ActionState::Success {
                message: raw.message,
                data,
            }),
            (true, None) => Err(de::Error::custom(
                "success envelope is missing its data field",
            )),
            (false, None) => Ok(ActionState::Failure {
                message: raw.message,
            }),
            (false, Some(_)) => Err(de::Error::custom(
                "failure envelope must not carry a data field",
            )),
        }
    }
}
