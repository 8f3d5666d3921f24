//! Wire-level message definitions for the WebSocket adapter.
//!
//! Clients open the socket and send a [`ConnectRequest`] as their first text
//! frame. Every later server frame is a [`NotificationMessage`] tagged by
//! `type`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{Contact, Notification, Role};

/// First client frame binding the connection to a user.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    pub user_role: Role,
    pub user_id: Uuid,
}

/// Name and email of the other party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
}

impl From<&Contact> for ContactMessage {
    fn from(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            email: contact.email.clone(),
        }
    }
}

/// Outbound notification frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NotificationMessage {
    #[serde(rename_all = "camelCase")]
    NewProposition {
        message: &'static str,
        request_id: String,
        passengers: Vec<ContactMessage>,
        length_delta_m: f64,
        duration_delta_ms: i64,
    },
    RoadAccepted {
        message: &'static str,
        driver: ContactMessage,
    },
    RoadRejected { message: &'static str },
}

impl From<&Notification> for NotificationMessage {
    fn from(value: &Notification) -> Self {
        match value {
            Notification::NewProposition {
                request_id,
                passengers,
                length_delta_m,
                duration_delta_ms,
            } => Self::NewProposition {
                message: "New passengers want to join your road",
                request_id: request_id.to_string(),
                passengers: passengers.iter().map(ContactMessage::from).collect(),
                length_delta_m: *length_delta_m,
                duration_delta_ms: *duration_delta_ms,
            },
            Notification::RoadAccepted { driver } => Self::RoadAccepted {
                message: "Your road has been accepted",
                driver: driver.into(),
            },
            Notification::RoadRejected => Self::RoadRejected {
                message: "Your road has been rejected",
            },
        }
    }
}

/// Acknowledgement sent once the connection is registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedMessage {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub user_role: Role,
    pub user_id: Uuid,
}

impl ConnectedMessage {
    pub fn new(request: &ConnectRequest) -> Self {
        Self {
            kind: "connected",
            user_role: request.user_role,
            user_id: request.user_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use insta::assert_json_snapshot;
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::RequestId;

    fn contact(name: &str) -> Contact {
        Contact {
            name: name.to_owned(),
            email: format!("{}@example.com", name.to_lowercase()),
        }
    }

    #[rstest]
    fn serialises_new_proposition() {
        let request_id: RequestId = "5c2d1e8f-3a4b-4c6d-9e7f-1a2b3c4d5e6f"
            .parse()
            .expect("static test UUID must be valid");
        let notification = Notification::NewProposition {
            request_id,
            passengers: vec![contact("Grace"), contact("Alan")],
            length_delta_m: 120.5,
            duration_delta_ms: 400,
        };

        assert_json_snapshot!(NotificationMessage::from(&notification), @r#"
        {
          "type": "new_proposition",
          "message": "New passengers want to join your road",
          "requestId": "5c2d1e8f-3a4b-4c6d-9e7f-1a2b3c4d5e6f",
          "passengers": [
            {
              "name": "Grace",
              "email": "grace@example.com"
            },
            {
              "name": "Alan",
              "email": "alan@example.com"
            }
          ],
          "lengthDeltaM": 120.5,
          "durationDeltaMs": 400
        }
        "#);
    }

    #[rstest]
    fn serialises_road_accepted() {
        let notification = Notification::RoadAccepted {
            driver: contact("Ada"),
        };

        assert_json_snapshot!(NotificationMessage::from(&notification), @r#"
        {
          "type": "road_accepted",
          "message": "Your road has been accepted",
          "driver": {
            "name": "Ada",
            "email": "ada@example.com"
          }
        }
        "#);
    }

    #[rstest]
    fn serialises_road_rejected() {
        assert_json_snapshot!(NotificationMessage::from(&Notification::RoadRejected), @r#"
        {
          "type": "road_rejected",
          "message": "Your road has been rejected"
        }
        "#);
    }

    #[rstest]
    #[case(json!({"userRole": "driver", "userId": Uuid::nil()}), Role::Driver)]
    #[case(json!({"userRole": "passenger", "userId": Uuid::nil()}), Role::Passenger)]
    fn parses_connect_request(#[case] raw: serde_json::Value, #[case] role: Role) {
        let request: ConnectRequest = serde_json::from_value(raw).expect("valid request");

        assert_eq!(request.user_role, role);
        assert_eq!(request.user_id, Uuid::nil());
    }

    #[rstest]
    #[case(json!({"userRole": "admin", "userId": Uuid::nil()}))]
    #[case(json!({"userRole": "driver", "userId": "nope"}))]
    #[case(json!({"userRole": "driver"}))]
    fn rejects_malformed_connect_request(#[case] raw: serde_json::Value) {
        assert!(serde_json::from_value::<ConnectRequest>(raw).is_err());
    }
}
