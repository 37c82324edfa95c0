//! Notifier: composes flight alerts and dispatches them through the enabled
//! delivery channels.
//!
//! Delivery order is fixed: the admin first, then (only when
//! `notifyPassengersDirectly` is on) each passenger with contact details.
//! Every external attempt lands in the bounded [`NotificationHistory`],
//! successful or not. Delivery failures never escape `notify`.

pub mod email;
pub mod handlers;
pub mod history;
pub mod messages;
pub mod settings;
pub mod sms;
pub mod transport;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::models::{Flight, Passenger};
use history::{NotificationHistory, NotificationRecord};
use settings::{NotificationSettings, SettingsError, SettingsPatch, SettingsStore};
use transport::{DeliveryMethod, DeliveryTransport};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryOutcome {
    pub success: bool,
    pub method: DeliveryMethod,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

impl DeliveryOutcome {
    fn none() -> Self {
        Self {
            success: false,
            method: DeliveryMethod::None,
            detail: "No notification method available".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// The channel implementations the notifier dispatches through.
pub struct Transports {
    pub email: Arc<dyn DeliveryTransport>,
    pub sms: Arc<dyn DeliveryTransport>,
    pub log: Arc<dyn DeliveryTransport>,
}

/// Where one message goes. `label` names the recipient in logs and history
/// when no address applies.
#[derive(Debug, Clone)]
struct Recipient {
    label: String,
    email: Option<String>,
    phone: Option<String>,
}

impl Recipient {
    fn admin(settings: &NotificationSettings) -> Self {
        Self {
            label: "ADMIN".to_string(),
            email: Some(settings.admin_email.clone()).filter(|e| !e.is_empty()),
            phone: Some(settings.admin_phone.clone()).filter(|p| !p.is_empty()),
        }
    }

    fn passenger(passenger: &Passenger) -> Self {
        Self {
            label: passenger.name.clone(),
            email: passenger.email.clone(),
            phone: passenger.phone.clone(),
        }
    }
}

pub struct Notifier {
    settings: RwLock<NotificationSettings>,
    settings_store: Arc<dyn SettingsStore>,
    transports: Transports,
    history: NotificationHistory,
}

impl Notifier {
    pub fn new(
        settings: NotificationSettings,
        settings_store: Arc<dyn SettingsStore>,
        transports: Transports,
    ) -> Self {
        Self {
            settings: RwLock::new(settings),
            settings_store,
            transports,
            history: NotificationHistory::default(),
        }
    }

    pub async fn settings(&self) -> NotificationSettings {
        self.settings.read().await.clone()
    }

    /// Applies a partial update and persists it. The in-memory settings only
    /// change once the write succeeded.
    pub async fn update_settings(
        &self,
        patch: SettingsPatch,
    ) -> Result<NotificationSettings, SettingsError> {
        let mut guard = self.settings.write().await;
        let mut updated = guard.clone();
        updated.apply(patch);
        self.settings_store.save(&updated).await?;
        *guard = updated.clone();
        info!(
            "Notification settings updated: log={} email={} sms={} passengers={}",
            updated.log_notifications,
            updated.email_enabled,
            updated.sms_enabled,
            updated.notify_passengers_directly
        );
        Ok(updated)
    }

    pub fn history(&self) -> Vec<NotificationRecord> {
        self.history.snapshot()
    }

    /// Alerts the admin about `flight`, then fans out to passengers if enabled.
    /// Returns the admin delivery outcome.
    pub async fn notify(&self, flight: &Flight, passengers: &[Passenger]) -> DeliveryOutcome {
        let settings = self.settings().await;
        let subject = messages::subject(flight);

        let admin_body = messages::admin_summary(flight, passengers.len());
        let outcome = self
            .send(&settings, &Recipient::admin(&settings), &subject, &admin_body)
            .await;

        if settings.notify_passengers_directly {
            let body = messages::passenger_message(flight);
            let mut delivered = 0;
            for passenger in passengers
                .iter()
                .filter(|p| p.email.is_some() || p.phone.is_some())
            {
                let result = self
                    .send(&settings, &Recipient::passenger(passenger), &subject, &body)
                    .await;
                if result.success {
                    delivered += 1;
                }
            }
            info!(
                "Passenger fan-out for {}: {delivered}/{} delivered",
                flight.flight_number,
                passengers.len()
            );
        }

        outcome
    }

    /// Sends a free-form message to the admin through the normal dispatch path.
    pub async fn send_test(&self, message: &str) -> DeliveryOutcome {
        let settings = self.settings().await;
        self.send(
            &settings,
            &Recipient::admin(&settings),
            "Test Notification",
            message,
        )
        .await
    }

    async fn send(
        &self,
        settings: &NotificationSettings,
        recipient: &Recipient,
        subject: &str,
        body: &str,
    ) -> DeliveryOutcome {
        let log_result = if settings.log_notifications {
            Some(
                self.transports
                    .log
                    .deliver(&recipient.label, subject, body)
                    .await,
            )
        } else {
            None
        };

        let mut attempts = Vec::new();
        if settings.email_enabled {
            if let Some(address) = &recipient.email {
                attempts.push(
                    self.attempt(&self.transports.email, address, subject, body)
                        .await,
                );
            }
        }
        if settings.sms_enabled {
            if let Some(phone) = &recipient.phone {
                attempts.push(self.attempt(&self.transports.sms, phone, subject, body).await);
            }
        }

        if attempts.is_empty() {
            // Log-only mode: the message is recorded but nothing left the process.
            if let Some(result) = log_result {
                self.history.record(NotificationRecord {
                    recipient: recipient.label.clone(),
                    subject: subject.to_string(),
                    body: body.to_string(),
                    method: DeliveryMethod::Log,
                    timestamp: Utc::now(),
                    success: result.is_ok(),
                    detail: result.unwrap_or_else(|e| e.to_string()),
                });
            }
            return DeliveryOutcome::none();
        }

        // Prefer reporting a channel that worked.
        let index = attempts.iter().position(|o| o.success).unwrap_or(0);
        attempts.swap_remove(index)
    }

    async fn attempt(
        &self,
        transport: &Arc<dyn DeliveryTransport>,
        address: &str,
        subject: &str,
        body: &str,
    ) -> DeliveryOutcome {
        let method = transport.method();
        let (success, detail) = match transport.deliver(address, subject, body).await {
            Ok(detail) => (true, detail),
            Err(e) => {
                warn!("{} delivery to {address} failed: {e}", method.as_str());
                (false, e.to_string())
            }
        };
        let timestamp = Utc::now();

        self.history.record(NotificationRecord {
            recipient: address.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            method,
            timestamp,
            success,
            detail: detail.clone(),
        });

        DeliveryOutcome {
            success,
            method,
            detail,
            timestamp,
        }
    }
}
