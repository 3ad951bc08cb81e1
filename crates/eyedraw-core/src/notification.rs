//! Notifications a drawing emits to its embedding application and to the
//! synchronization broker.

use crate::doodle::DoodleId;
use crate::parameter::ParamValue;
use serde::{Deserialize, Serialize};

/// Names of the events a drawing emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NotificationKind {
    Ready,
    DoodlesLoaded,
    DoodleAdded,
    DoodleDeleted,
    DoodleSelected,
    DoodleDeselected,
    #[serde(rename = "mousedragged")]
    MouseDragged,
    ParameterChanged,
}

impl NotificationKind {
    pub const ALL: [NotificationKind; 8] = [
        Self::Ready,
        Self::DoodlesLoaded,
        Self::DoodleAdded,
        Self::DoodleDeleted,
        Self::DoodleSelected,
        Self::DoodleDeselected,
        Self::MouseDragged,
        Self::ParameterChanged,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Ready => "ready",
            Self::DoodlesLoaded => "doodlesLoaded",
            Self::DoodleAdded => "doodleAdded",
            Self::DoodleDeleted => "doodleDeleted",
            Self::DoodleSelected => "doodleSelected",
            Self::DoodleDeselected => "doodleDeselected",
            Self::MouseDragged => "mousedragged",
            Self::ParameterChanged => "parameterChanged",
        }
    }
}

/// Identifies the doodle a notification is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoodleRef {
    pub id: DoodleId,
    pub class_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPayload {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doodle: Option<DoodleRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<ParamValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_value: Option<ParamValue>,
}

/// A transient event; never persisted with the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub event_name: NotificationKind,
    pub object: NotificationPayload,
}

impl Notification {
    pub fn new(kind: NotificationKind) -> Self {
        Self {
            event_name: kind,
            object: NotificationPayload::default(),
        }
    }

    pub fn for_doodle(kind: NotificationKind, doodle: DoodleRef) -> Self {
        Self {
            event_name: kind,
            object: NotificationPayload {
                doodle: Some(doodle),
                ..NotificationPayload::default()
            },
        }
    }

    pub fn parameter_changed(doodle: DoodleRef, parameter: &str, value: ParamValue, old_value: ParamValue) -> Self {
        Self {
            event_name: NotificationKind::ParameterChanged,
            object: NotificationPayload {
                doodle: Some(doodle),
                parameter: Some(parameter.to_string()),
                value: Some(value),
                old_value: Some(old_value),
            },
        }
    }

    pub fn kind(&self) -> NotificationKind {
        self.event_name
    }

    pub fn is(&self, kind: NotificationKind) -> bool {
        self.event_name == kind
    }

    pub fn doodle(&self) -> Option<&DoodleRef> {
        self.object.doodle.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_wire_names_match_serde() {
        for kind in NotificationKind::ALL {
            let json = serde_json::to_value(kind).unwrap();
            assert_eq!(json, kind.name());
        }
    }

    #[test]
    fn test_parameter_changed_shape() {
        let id = Uuid::new_v4();
        let doodle = DoodleRef {
            id,
            class_name: "Lens".into(),
        };
        let n = Notification::parameter_changed(doodle, "originX", 15.0.into(), 10.0.into());
        let json = serde_json::to_value(&n).unwrap();
        assert_eq!(json["eventName"], "parameterChanged");
        assert_eq!(json["object"]["parameter"], "originX");
        assert_eq!(json["object"]["value"], 15.0);
        assert_eq!(json["object"]["oldValue"], 10.0);
        assert_eq!(json["object"]["doodle"]["className"], "Lens");
        assert_eq!(json["object"]["doodle"]["id"], id.to_string());
    }

    #[test]
    fn test_bare_notification_has_empty_object() {
        let json = serde_json::to_value(Notification::new(NotificationKind::Ready)).unwrap();
        assert_eq!(json["object"], serde_json::json!({}));
    }
}
