//! Command router — turns authorized chat events into replies and cycles.
//!
//! Only the configured recipient is served. Events from any other chat are
//! dropped without a reply so the bot does not reveal itself.

use std::fmt::Write as _;

use pihub_domain::chat::{CallbackAction, ChatId, InboundEvent, InboundKind, Keyboard, MessageId};
use pihub_domain::error::DispatchError;
use pihub_domain::irrigation::{HoldDuration, IrrigationOutcome};

use crate::device_locks::DeviceLocks;
use crate::ports::{ChatTransport, CpuSensor, DeviceConnector, Notifier};
use crate::services::cpu_info::CpuInfoService;
use crate::services::irrigation_service::IrrigationService;
use crate::services::notification_dispatcher::NotificationDispatcher;

const HOME_MENU: &str = "🏠 Home Menu:";
const DURATION_MENU: &str = "💧 Choose irrigation duration:";
const CANCELLED: &str = "❌ Cancelled.";
const QUEUED: &str = "⏳ Another irrigation is running on this outlet, yours will start when it ends.";
const IRRIGATE_USAGE: &str = "Usage: /irrigate <seconds>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Home,
    Cpu,
    Irrigate,
    Help,
}

struct CommandSpec {
    name: &'static str,
    usage: &'static str,
    summary: &'static str,
    command: Command,
}

const COMMANDS: &[CommandSpec] = &[
    CommandSpec {
        name: "home",
        usage: "/home",
        summary: "show the home menu",
        command: Command::Home,
    },
    CommandSpec {
        name: "start",
        usage: "/start",
        summary: "show the home menu",
        command: Command::Home,
    },
    CommandSpec {
        name: "cpu",
        usage: "/cpu",
        summary: "CPU temperature, frequency and usage",
        command: Command::Cpu,
    },
    CommandSpec {
        name: "irrigate",
        usage: "/irrigate <seconds>",
        summary: "run irrigation for a number of seconds",
        command: Command::Irrigate,
    },
    CommandSpec {
        name: "help",
        usage: "/help",
        summary: "list commands",
        command: Command::Help,
    },
];

fn lookup(name: &str) -> Option<Command> {
    COMMANDS
        .iter()
        .find(|spec| spec.name == name)
        .map(|spec| spec.command)
}

fn help_text() -> String {
    let mut text = String::from("Commands:");
    for spec in COMMANDS {
        let _ = write!(text, "\n{} - {}", spec.usage, spec.summary);
    }
    text
}

fn starting_text(duration: HoldDuration) -> String {
    format!("🌱 Starting irrigation for {} seconds...", duration.as_secs())
}

/// Dispatches inbound chat events for a single authorized recipient.
///
/// Irrigation cycles on the same outlet are serialised through
/// [`DeviceLocks`]; a second request waits for the first and is told so.
pub struct CommandRouter<C, T, N, S> {
    recipient: ChatId,
    irrigation: IrrigationService<C>,
    cpu_info: CpuInfoService<S>,
    transport: T,
    dispatcher: NotificationDispatcher<N>,
    locks: DeviceLocks,
}

impl<C, T, N, S> CommandRouter<C, T, N, S>
where
    C: DeviceConnector,
    T: ChatTransport,
    N: Notifier,
    S: CpuSensor,
{
    pub fn new(
        recipient: ChatId,
        irrigation: IrrigationService<C>,
        cpu_info: CpuInfoService<S>,
        transport: T,
        dispatcher: NotificationDispatcher<N>,
        locks: DeviceLocks,
    ) -> Self {
        Self {
            recipient,
            irrigation,
            cpu_info,
            transport,
            dispatcher,
            locks,
        }
    }

    /// Handle one inbound event to completion.
    ///
    /// For an irrigation request this returns only after the cycle has
    /// finished and its outcome has been dispatched.
    #[tracing::instrument(skip_all, fields(sender = %event.sender))]
    pub async fn route(&self, event: InboundEvent) {
        if event.sender != self.recipient {
            tracing::warn!("dropping event from unauthorized chat");
            return;
        }
        match event.kind {
            InboundKind::Command { name, args } => self.handle_command(&name, &args).await,
            InboundKind::Callback {
                query_id,
                message_id,
                payload,
            } => self.handle_callback(&query_id, message_id, &payload).await,
        }
    }

    async fn handle_command(&self, name: &str, args: &str) {
        tracing::info!(command = name, "command received");
        match lookup(name) {
            Some(Command::Home) => self.reply(HOME_MENU, Some(&Keyboard::home())).await,
            Some(Command::Cpu) => {
                let report = self.cpu_info.report().await;
                self.reply(&report.to_string(), None).await;
            }
            Some(Command::Irrigate) => match args.parse::<HoldDuration>() {
                Ok(duration) => {
                    self.reply(&starting_text(duration), None).await;
                    self.irrigate(duration).await;
                }
                Err(err) => {
                    self.reply(&format!("❌ {err}\n{IRRIGATE_USAGE}"), None)
                        .await;
                }
            },
            Some(Command::Help) => self.reply(&help_text(), None).await,
            None => {
                self.reply(&format!("❓ Unknown command /{name}.\n\n{}", help_text()), None)
                    .await;
            }
        }
    }

    async fn handle_callback(&self, query_id: &str, message: MessageId, payload: &str) {
        tracing::info!(payload, "callback received");
        log_failure("answer callback", self.transport.answer_callback(query_id).await);
        match CallbackAction::parse(payload) {
            Ok(Some(CallbackAction::ShowDurations)) => {
                self.edit(message, DURATION_MENU, Some(&Keyboard::irrigation_durations()))
                    .await;
            }
            Ok(Some(CallbackAction::Cancel)) => self.edit(message, CANCELLED, None).await,
            Ok(Some(CallbackAction::Irrigate(duration))) => {
                self.edit(message, &starting_text(duration), None).await;
                self.irrigate(duration).await;
            }
            Ok(None) => {
                tracing::warn!(payload, "unrecognised callback payload");
                self.reply("❓ Unknown action.", None).await;
            }
            Err(err) => self.reply(&format!("❌ {err}"), None).await,
        }
    }

    /// Run one cycle under the device lock and dispatch its outcome.
    async fn irrigate(&self, duration: HoldDuration) {
        let outcome = self.run_exclusive(duration).await;
        let _ = self
            .dispatcher
            .send(self.recipient, &outcome.to_string())
            .await;
    }

    async fn run_exclusive(&self, duration: HoldDuration) -> IrrigationOutcome {
        // Unresolvable settings fail before any device I/O; nothing to lock.
        let Some(device) = self.irrigation.identity() else {
            return self.irrigation.run_irrigation_cycle(duration).await;
        };
        let _guard = match self.locks.try_lock(&device) {
            Some(guard) => guard,
            None => {
                tracing::info!(%device, "device busy, cycle queued");
                self.reply(QUEUED, None).await;
                self.locks.lock(&device).await
            }
        };
        self.irrigation.run_irrigation_cycle(duration).await
    }

    async fn reply(&self, text: &str, keyboard: Option<&Keyboard>) {
        log_failure(
            "send message",
            self.transport
                .send_message(self.recipient, text, keyboard)
                .await,
        );
    }

    async fn edit(&self, message: MessageId, text: &str, keyboard: Option<&Keyboard>) {
        log_failure(
            "edit message",
            self.transport
                .edit_message(self.recipient, message, text, keyboard)
                .await,
        );
    }
}

fn log_failure(action: &'static str, result: Result<(), DispatchError>) {
    if let Err(err) = result {
        tracing::warn!(action, error = %err, "chat request failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::irrigation_service::DEFAULT_IO_TIMEOUT;
    use crate::services::notification_dispatcher::DEFAULT_DISPATCH_TIMEOUT;
    use crate::testing::{FakePlug, PlugCall, RecordingChat, Sent, StubSensor};
    use pihub_domain::device::DeviceSettings;
    use pihub_domain::power::PowerState;
    use tokio_util::sync::CancellationToken;

    const OWNER: ChatId = ChatId(1001);

    type Router = CommandRouter<FakePlug, RecordingChat, RecordingChat, StubSensor>;

    fn settings() -> DeviceSettings {
        DeviceSettings {
            address: Some("192.168.1.55".to_string()),
            model: Some("p100".to_string()),
            username: Some("me@example.com".to_string()),
            password: Some("secret".to_string()),
        }
    }

    fn router_with(plug: &FakePlug, settings: DeviceSettings) -> Router {
        router_until(plug, settings, CancellationToken::new())
    }

    fn router_until(
        plug: &FakePlug,
        settings: DeviceSettings,
        shutdown: CancellationToken,
    ) -> Router {
        CommandRouter::new(
            OWNER,
            IrrigationService::new(plug.clone(), settings, DEFAULT_IO_TIMEOUT, shutdown),
            CpuInfoService::new(StubSensor::healthy(49.4)),
            RecordingChat::default(),
            NotificationDispatcher::new(RecordingChat::default(), DEFAULT_DISPATCH_TIMEOUT),
            DeviceLocks::new(),
        )
    }

    fn router(plug: &FakePlug) -> Router {
        router_with(plug, settings())
    }

    fn command(sender: ChatId, name: &str, args: &str) -> InboundEvent {
        InboundEvent {
            sender,
            kind: InboundKind::Command {
                name: name.to_string(),
                args: args.to_string(),
            },
        }
    }

    fn callback(payload: &str) -> InboundEvent {
        InboundEvent {
            sender: OWNER,
            kind: InboundKind::Callback {
                query_id: "q1".to_string(),
                message_id: MessageId(77),
                payload: payload.to_string(),
            },
        }
    }

    fn message(text: &str) -> Sent {
        Sent::Message {
            chat: OWNER,
            text: text.to_string(),
            keyboard: None,
        }
    }

    fn outcomes(router: &Router) -> Vec<String> {
        router
            .dispatcher
            .notifier()
            .sent()
            .into_iter()
            .filter_map(|sent| match sent {
                Sent::Notify { chat, text } if chat == OWNER => Some(text),
                _ => None,
            })
            .collect()
    }

    #[tokio::test]
    async fn should_silently_drop_events_from_other_chats() {
        let plug = FakePlug::new(PowerState::Off);
        let router = router(&plug);

        router.route(command(ChatId(666), "home", "")).await;
        router
            .route(InboundEvent {
                sender: ChatId(666),
                ..callback("irrigation:5")
            })
            .await;

        assert!(router.transport.sent().is_empty());
        assert!(outcomes(&router).is_empty());
        assert!(plug.calls().is_empty());
    }

    #[tokio::test]
    async fn should_render_home_menu_for_home_and_start() {
        let router = router(&FakePlug::new(PowerState::Off));

        router.route(command(OWNER, "home", "")).await;
        router.route(command(OWNER, "start", "")).await;

        let expected = Sent::Message {
            chat: OWNER,
            text: HOME_MENU.to_string(),
            keyboard: Some(Keyboard::home()),
        };
        assert_eq!(router.transport.sent(), [expected.clone(), expected]);
    }

    #[tokio::test]
    async fn should_reply_with_cpu_report() {
        let router = router(&FakePlug::new(PowerState::Off));

        router.route(command(OWNER, "cpu", "")).await;

        assert_eq!(
            router.transport.sent(),
            [message("🌡 | 49.4'C\n⏱ | 1500MHz (1800)\n📊 | [2.0, 4.0] %")]
        );
    }

    #[tokio::test]
    async fn should_answer_unknown_command_with_help() {
        let router = router(&FakePlug::new(PowerState::Off));

        router.route(command(OWNER, "reboot", "")).await;

        let sent = router.transport.sent();
        assert_eq!(sent.len(), 1);
        let Sent::Message { text, .. } = &sent[0] else {
            panic!("expected a message, got {sent:?}");
        };
        assert!(text.starts_with("❓ Unknown command /reboot."));
        assert!(text.contains("/irrigate <seconds>"));
    }

    #[test]
    fn should_list_every_command_in_help() {
        let text = help_text();
        for spec in COMMANDS {
            assert!(text.contains(spec.usage), "{} missing from help", spec.name);
        }
    }

    #[tokio::test]
    async fn should_show_duration_menu_on_irrigation_callback() {
        let router = router(&FakePlug::new(PowerState::Off));

        router.route(callback("irrigation")).await;

        assert_eq!(
            router.transport.sent(),
            [
                Sent::Answer("q1".to_string()),
                Sent::Edit {
                    chat: OWNER,
                    message: MessageId(77),
                    text: DURATION_MENU.to_string(),
                    keyboard: Some(Keyboard::irrigation_durations()),
                }
            ]
        );
    }

    #[tokio::test]
    async fn should_edit_message_on_cancel() {
        let plug = FakePlug::new(PowerState::Off);
        let router = router(&plug);

        router.route(callback("cancel")).await;

        assert_eq!(
            router.transport.sent()[1],
            Sent::Edit {
                chat: OWNER,
                message: MessageId(77),
                text: CANCELLED.to_string(),
                keyboard: None,
            }
        );
        assert!(plug.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_run_cycle_and_dispatch_outcome_on_duration_callback() {
        let plug = FakePlug::new(PowerState::Off);
        let router = router(&plug);

        router.route(callback("irrigation:20")).await;

        assert_eq!(
            router.transport.sent()[1],
            Sent::Edit {
                chat: OWNER,
                message: MessageId(77),
                text: "🌱 Starting irrigation for 20 seconds...".to_string(),
                keyboard: None,
            }
        );
        assert_eq!(outcomes(&router), ["🌱 Irrigation ran for 20s."]);
        assert_eq!(plug.state(), PowerState::Off);
        assert_eq!(plug.set_calls(), 2);
    }

    #[tokio::test]
    async fn should_reject_invalid_duration_payload_without_device_io() {
        let plug = FakePlug::new(PowerState::Off);
        let router = router(&plug);

        router.route(callback("irrigation:0")).await;

        let sent = router.transport.sent();
        assert_eq!(sent.len(), 2);
        assert!(matches!(&sent[1], Sent::Message { text, .. } if text.starts_with("❌")));
        assert!(plug.calls().is_empty());
        assert!(outcomes(&router).is_empty());
    }

    #[tokio::test]
    async fn should_reply_once_to_unknown_callback() {
        let router = router(&FakePlug::new(PowerState::Off));

        router.route(callback("lights:on")).await;

        assert_eq!(
            router.transport.sent(),
            [Sent::Answer("q1".to_string()), message("❓ Unknown action.")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn should_irrigate_from_text_command() {
        let plug = FakePlug::new(PowerState::On);
        let router = router(&plug);

        router.route(command(OWNER, "irrigate", "5")).await;

        assert_eq!(
            router.transport.sent(),
            [message("🌱 Starting irrigation for 5 seconds...")]
        );
        assert_eq!(outcomes(&router), ["🌱 Irrigation ran for 5s."]);
        assert_eq!(plug.state(), PowerState::On);
    }

    #[tokio::test]
    async fn should_show_usage_for_bad_irrigate_argument() {
        let plug = FakePlug::new(PowerState::Off);
        let router = router(&plug);

        router.route(command(OWNER, "irrigate", "")).await;
        router.route(command(OWNER, "irrigate", "-3")).await;

        let sent = router.transport.sent();
        assert_eq!(sent.len(), 2);
        for reply in sent {
            assert!(matches!(reply, Sent::Message { text, .. } if text.ends_with(IRRIGATE_USAGE)));
        }
        assert!(plug.calls().is_empty());
    }

    #[tokio::test]
    async fn should_dispatch_configuration_error_outcome() {
        let plug = FakePlug::new(PowerState::Off);
        let router = router_with(&plug, DeviceSettings::default());

        router.route(callback("irrigation:5")).await;

        let outcomes = outcomes(&router);
        assert_eq!(outcomes.len(), 1);
        assert!(outcomes[0].contains("TAPO_IP"));
        assert!(plug.calls().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn should_serialise_cycles_on_the_same_device() {
        let plug = FakePlug::new(PowerState::Off);
        let router = router(&plug);

        tokio::join!(
            router.route(callback("irrigation:5")),
            router.route(callback("irrigation:5")),
        );

        assert_eq!(
            plug.calls(),
            [
                PlugCall::Connect,
                PlugCall::Read,
                PlugCall::Set(PowerState::On),
                PlugCall::Set(PowerState::Off),
                PlugCall::Connect,
                PlugCall::Read,
                PlugCall::Set(PowerState::On),
                PlugCall::Set(PowerState::Off),
            ]
        );
        assert!(router.transport.sent().contains(&message(QUEUED)));
        assert_eq!(outcomes(&router).len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn should_not_start_queued_cycle_after_shutdown() {
        let plug = FakePlug::new(PowerState::Off);
        let shutdown = CancellationToken::new();
        let router = router_until(&plug, settings(), shutdown.clone());

        let stop = async {
            tokio::time::sleep(std::time::Duration::from_secs(2)).await;
            shutdown.cancel();
        };
        tokio::join!(
            router.route(callback("irrigation:60")),
            router.route(callback("irrigation:60")),
            stop,
        );

        assert_eq!(
            plug.calls(),
            [
                PlugCall::Connect,
                PlugCall::Read,
                PlugCall::Set(PowerState::On),
                PlugCall::Set(PowerState::Off),
            ]
        );
        assert_eq!(plug.state(), PowerState::Off);
        assert!(router.transport.sent().contains(&message(QUEUED)));
        let outcomes = outcomes(&router);
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes[0].contains("stopped after 2s of 60s"), "{}", outcomes[0]);
        assert_eq!(outcomes[1], IrrigationOutcome::ShuttingDown.to_string());
    }

    #[tokio::test(start_paused = true)]
    async fn should_still_dispatch_outcome_when_chat_replies_fail() {
        let plug = FakePlug::new(PowerState::Off);
        let router = CommandRouter::new(
            OWNER,
            IrrigationService::new(
                plug.clone(),
                settings(),
                DEFAULT_IO_TIMEOUT,
                CancellationToken::new(),
            ),
            CpuInfoService::new(StubSensor::healthy(49.4)),
            RecordingChat::failing(),
            NotificationDispatcher::new(RecordingChat::default(), DEFAULT_DISPATCH_TIMEOUT),
            DeviceLocks::new(),
        );

        router.route(callback("irrigation:5")).await;

        assert_eq!(plug.set_calls(), 2);
        assert_eq!(outcomes(&router), ["🌱 Irrigation ran for 5s."]);
    }
}
