//! Event routing and prompt timers.
//!
//! The hub owns every live session. Each session sits behind its own mutex so
//! one user's events never wait on another's; the registry lock is held only
//! to look a session up or to add and remove one. Outbound messages are sent
//! after the session lock has been released.
//!
//! Each channel has at most one live invitation. Posting a new one, by a
//! fresh start or after a roll, retires the previous one, so idle invitations
//! never pile up. Every other session ends by rolling or by timing out.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{Mutex, RwLock, mpsc};
use tracing::{debug, info, warn};

use wb_dice::RandomSource;

use crate::config::SessionConfig;
use crate::error::{SessionError, SessionResult};
use crate::event::{Interaction, Outbound};
use crate::ids::{ChannelId, PromptId, SessionId, UserId};
use crate::machine::{SessionMachine, SessionState};
use crate::render;

type SessionHandle = Arc<Mutex<SessionMachine>>;

#[derive(Default)]
struct Registry {
    sessions: HashMap<SessionId, SessionHandle>,
    /// The live invitation in each channel.
    invitations: HashMap<ChannelId, SessionId>,
}

impl Registry {
    fn remove(&mut self, id: SessionId) {
        self.sessions.remove(&id);
        self.invitations.retain(|_, live| *live != id);
    }
}

struct HubInner {
    config: SessionConfig,
    random: Arc<dyn RandomSource>,
    outbound: mpsc::Sender<Outbound>,
    registry: RwLock<Registry>,
}

/// Routes transport events to sessions and delivers their output.
///
/// Cloning a hub is cheap; clones share the same sessions.
#[derive(Clone)]
pub struct SessionHub {
    inner: Arc<HubInner>,
}

/// The active prompt of a session and when it runs out.
struct Timer {
    session: SessionId,
    prompt: PromptId,
    at: Instant,
}

impl SessionHub {
    /// Create a hub that rolls with `random` and delivers to `outbound`.
    pub fn new(
        config: SessionConfig,
        random: Arc<dyn RandomSource>,
        outbound: mpsc::Sender<Outbound>,
    ) -> Self {
        Self {
            inner: Arc::new(HubInner {
                config,
                random,
                outbound,
                registry: RwLock::new(Registry::default()),
            }),
        }
    }

    /// Handle one event from the transport.
    ///
    /// Errors have already been dealt with when this returns: silent ones
    /// were dropped and a failed roll was reported to its owner. They are
    /// returned so callers can observe them.
    pub async fn dispatch(&self, interaction: Interaction) -> SessionResult<()> {
        match interaction {
            Interaction::SessionStart { invoker, channel } => {
                self.start_session(invoker, channel).await;
                Ok(())
            }
            event => self.route(event).await,
        }
    }

    /// Number of live sessions, invitations included.
    pub async fn active_sessions(&self) -> usize {
        self.inner.registry.read().await.sessions.len()
    }

    /// State of a live session.
    pub async fn session_state(&self, id: SessionId) -> Option<SessionState> {
        let handle = self.lookup(id).await?;
        let machine = handle.lock().await;
        Some(machine.state())
    }

    async fn start_session(&self, invoker: UserId, channel: ChannelId) {
        if !self.inner.config.accepting_invocations {
            debug!(user = %invoker, "not accepting invocations, ignoring start");
            return;
        }
        let mut machine = SessionMachine::new(invoker, channel, self.inner.config.clone());
        let outbound = machine.start(now());
        self.register(machine).await;
        self.deliver(outbound).await;
    }

    async fn route(&self, event: Interaction) -> SessionResult<()> {
        let Some(id) = event.session() else {
            return Err(SessionError::InvalidSelection(
                "event carries no session".to_string(),
            ));
        };
        let Some(handle) = self.lookup(id).await else {
            debug!(session = %id, user = %event.user(), "event for unknown session dropped");
            return Err(SessionError::UnknownSession(id));
        };

        let (result, owner, terminal, timer) = {
            let mut machine = handle.lock().await;
            let before = machine.active_prompt().map(|p| p.id);
            let result = machine.handle(&event, now(), self.inner.random.as_ref());
            // Only a newly presented prompt needs a timer.
            let moved = machine.active_prompt().map(|p| p.id) != before;
            (
                result,
                machine.owner().clone(),
                machine.state().is_terminal(),
                timer_for(&machine).filter(|_| moved),
            )
        };

        if terminal {
            self.inner.registry.write().await.remove(id);
        }

        match result {
            Ok(transition) => {
                if let Some(timer) = timer {
                    self.schedule(timer);
                }
                if let Some(successor) = transition.successor {
                    self.register(successor).await;
                }
                self.deliver(transition.outbound).await;
                Ok(())
            }
            Err(err) if err.is_silent() => {
                debug!(session = %id, user = %event.user(), error = %err, "event dropped");
                Err(err)
            }
            Err(SessionError::Dice(err)) => {
                warn!(session = %id, user = %owner, error = %err, "roll failed");
                self.deliver(vec![Outbound::Ephemeral {
                    target: owner,
                    text: render::roll_failed(&err),
                    prompt: None,
                }])
                .await;
                Err(SessionError::Dice(err))
            }
            Err(err) => Err(err),
        }
    }

    async fn lookup(&self, id: SessionId) -> Option<SessionHandle> {
        self.inner.registry.read().await.sessions.get(&id).cloned()
    }

    /// Add a started session. An invitation replaces its channel's previous one.
    async fn register(&self, machine: SessionMachine) {
        let id = machine.id();
        let timer = timer_for(&machine);
        let channel = machine.is_invitation().then(|| machine.channel().clone());
        {
            let mut registry = self.inner.registry.write().await;
            let retired = channel.and_then(|channel| registry.invitations.insert(channel, id));
            if let Some(retired) = retired {
                registry.sessions.remove(&retired);
                debug!(invitation = %retired, replaced_by = %id, "invitation retired");
            }
            registry.sessions.insert(id, Arc::new(Mutex::new(machine)));
        }
        if let Some(timer) = timer {
            self.schedule(timer);
        }
    }

    /// Expire `session` when `timer` runs out, unless its prompt has moved on.
    fn schedule(&self, timer: Timer) {
        let hub = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep_until(tokio::time::Instant::from_std(timer.at)).await;
            hub.expire(timer.session, timer.prompt).await;
        });
    }

    async fn expire(&self, session: SessionId, prompt: PromptId) {
        let Some(handle) = self.lookup(session).await else {
            return;
        };
        let expired = handle.lock().await.expire(prompt);
        if expired {
            self.inner.registry.write().await.remove(session);
            info!(session = %session, prompt = %prompt, "prompt timed out");
        }
    }

    async fn deliver(&self, outbound: Vec<Outbound>) {
        for message in outbound {
            if self.inner.outbound.send(message).await.is_err() {
                warn!("outbound channel closed, dropping messages");
                return;
            }
        }
    }
}

fn timer_for(machine: &SessionMachine) -> Option<Timer> {
    let prompt = machine.active_prompt()?;
    let at = machine.deadline().at()?;
    Some(Timer {
        session: machine.id(),
        prompt: prompt.id,
        at,
    })
}

/// Current time on tokio's clock, so paused-time tests drive deadlines.
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    use super::*;
    use crate::event::Decision;
    use crate::prompt::{Prompt, Stage};
    use wb_dice::{DiceError, DiceResult, DieKind, OsRandom};

    struct Scripted(StdMutex<VecDeque<u32>>);

    impl RandomSource for Scripted {
        fn uniform(&self, n: u32) -> DiceResult<u32> {
            let next = self.0.lock().unwrap().pop_front().expect("script exhausted");
            assert!(next < n);
            Ok(next)
        }
    }

    /// Fails the first `n` draws, then succeeds.
    struct Flaky(StdMutex<u32>);

    impl RandomSource for Flaky {
        fn uniform(&self, n: u32) -> DiceResult<u32> {
            let mut failures = self.0.lock().unwrap();
            if *failures > 0 {
                *failures -= 1;
                return Err(DiceError::EntropyUnavailable("device busy".into()));
            }
            Ok(n - 1)
        }
    }

    fn hub_with(
        config: SessionConfig,
        random: Arc<dyn RandomSource>,
    ) -> (SessionHub, mpsc::Receiver<Outbound>) {
        let (tx, rx) = mpsc::channel(64);
        (SessionHub::new(config, random, tx), rx)
    }

    fn ana() -> UserId {
        UserId::new("ana")
    }

    fn bo() -> UserId {
        UserId::new("bo")
    }

    async fn start_in(
        hub: &SessionHub,
        rx: &mut mpsc::Receiver<Outbound>,
        channel: &str,
    ) -> Prompt {
        hub.dispatch(Interaction::SessionStart {
            invoker: ana(),
            channel: ChannelId::new(channel),
        })
        .await
        .unwrap();
        let message = rx.recv().await.unwrap();
        assert!(message.is_public());
        message.prompt().unwrap().clone()
    }

    async fn start(hub: &SessionHub, rx: &mut mpsc::Receiver<Outbound>) -> Prompt {
        start_in(hub, rx, "tavern").await
    }

    async fn press_as(
        hub: &SessionHub,
        rx: &mut mpsc::Receiver<Outbound>,
        prompt: &Prompt,
        answer: &str,
        user: UserId,
    ) -> Outbound {
        let option = prompt.option_for(answer).unwrap();
        hub.dispatch(prompt.interaction_for(option, user))
            .await
            .unwrap();
        rx.recv().await.unwrap()
    }

    async fn press(
        hub: &SessionHub,
        rx: &mut mpsc::Receiver<Outbound>,
        prompt: &Prompt,
        answer: &str,
    ) -> Outbound {
        press_as(hub, rx, prompt, answer, ana()).await
    }

    #[tokio::test]
    async fn end_to_end_pool_roll() {
        // d6: 4, 2, 6; plot: faces 3 and 6
        let random = Scripted(StdMutex::new([3, 1, 5, 2, 5].into_iter().collect()));
        let (hub, mut rx) = hub_with(SessionConfig::default(), Arc::new(random));

        let invitation = start(&hub, &mut rx).await;

        let msg = press(&hub, &mut rx, &invitation, "d6").await;
        assert!(!msg.is_public());
        let session = msg.prompt().unwrap().session;
        assert_ne!(session, invitation.session);

        let msg = press(&hub, &mut rx, msg.prompt().unwrap(), "3").await;
        assert_eq!(
            msg.prompt().unwrap().stage,
            Stage::AfterAdd {
                kind: DieKind::D6,
                count: 3
            }
        );
        let msg = press(&hub, &mut rx, msg.prompt().unwrap(), "Add More Dice").await;
        let msg = press(&hub, &mut rx, msg.prompt().unwrap(), "Plot").await;
        let msg = press(&hub, &mut rx, msg.prompt().unwrap(), "2").await;
        let summary = press(&hub, &mut rx, msg.prompt().unwrap(), "Roll Now!").await;

        assert!(summary.is_public());
        assert!(summary.prompt().is_none());
        let text = summary.text();
        assert!(text.contains("**3 × d6:** 4, 2, 6 (subtotal: 12)"));
        assert!(text.contains("**2 × Plot die:** Nothing happens, Opportunity"));
        assert!(text.contains("🧮 **Grand Total: 12**"));

        let next = rx.recv().await.unwrap();
        assert!(next.is_public());
        let next_prompt = next.prompt().unwrap();
        assert_eq!(next_prompt.stage, Stage::ChooseDieType);
        assert_ne!(next_prompt.session, invitation.session);

        // The rolled session is done and the new invitation replaced the old one.
        assert_eq!(hub.session_state(session).await, None);
        assert_eq!(hub.session_state(invitation.session).await, None);
        assert_eq!(
            hub.session_state(next_prompt.session).await,
            Some(SessionState::AwaitingDieType)
        );
        assert_eq!(hub.active_sessions().await, 1);
    }

    #[tokio::test]
    async fn invitation_is_shared_by_the_channel() {
        let (hub, mut rx) = hub_with(SessionConfig::default(), Arc::new(OsRandom::new()));
        let invitation = start(&hub, &mut rx).await;

        let for_bo = press_as(&hub, &mut rx, &invitation, "d20", bo()).await;
        match &for_bo {
            Outbound::Ephemeral { target, text, .. } => {
                assert_eq!(target, &bo());
                assert!(text.starts_with("🎲 <@bo> Select how many **d20**"));
            }
            other => panic!("expected a prompt for bo, got {other:?}"),
        }
        let bo_count = for_bo.prompt().unwrap().clone();

        // The invitation stays live for the invoker too.
        let for_ana = press(&hub, &mut rx, &invitation, "d4").await;
        let ana_count = for_ana.prompt().unwrap().clone();
        assert_ne!(ana_count.session, bo_count.session);
        assert_eq!(
            hub.session_state(invitation.session).await,
            Some(SessionState::AwaitingDieType)
        );
        assert_eq!(
            hub.session_state(bo_count.session).await,
            Some(SessionState::AwaitingCount(DieKind::D20))
        );
        assert_eq!(
            hub.session_state(ana_count.session).await,
            Some(SessionState::AwaitingCount(DieKind::D4))
        );

        // Only bo can answer bo's prompt.
        let option = bo_count.option_for("2").unwrap();
        let result = hub.dispatch(bo_count.interaction_for(option, ana())).await;
        assert!(matches!(result, Err(SessionError::InvalidSelection(_))));
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.active_sessions().await, 3);
    }

    #[tokio::test]
    async fn stale_event_is_dropped_without_output() {
        let (hub, mut rx) = hub_with(SessionConfig::default(), Arc::new(OsRandom::new()));
        let invitation = start(&hub, &mut rx).await;
        let msg = press(&hub, &mut rx, &invitation, "d8").await;
        let count_prompt = msg.prompt().unwrap().clone();
        press(&hub, &mut rx, &count_prompt, "2").await;

        let option = count_prompt.option_for("4").unwrap();
        let result = hub
            .dispatch(count_prompt.interaction_for(option, ana()))
            .await;
        assert!(matches!(result, Err(SessionError::Stale { .. })));
        assert!(rx.try_recv().is_err());
        assert_eq!(
            hub.session_state(count_prompt.session).await,
            Some(SessionState::AwaitingPoolDecision)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn invitations_do_not_accumulate() {
        let (hub, mut rx) = hub_with(SessionConfig::default(), Arc::new(OsRandom::new()));
        let first = start(&hub, &mut rx).await;
        start(&hub, &mut rx).await;
        let latest = start(&hub, &mut rx).await;
        start_in(&hub, &mut rx, "cellar").await;
        assert_eq!(hub.active_sessions().await, 2);

        // A retired invitation no longer answers.
        let option = first.option_for("d6").unwrap();
        let result = hub.dispatch(first.interaction_for(option, ana())).await;
        assert!(matches!(result, Err(SessionError::UnknownSession(_))));
        assert!(rx.try_recv().is_err());

        // Opened sessions that nobody finishes time out.
        press_as(&hub, &mut rx, &latest, "d6", bo()).await;
        press(&hub, &mut rx, &latest, "d10").await;
        assert_eq!(hub.active_sessions().await, 4);

        tokio::time::sleep(Duration::from_secs(30 * 86_400)).await;
        assert_eq!(hub.active_sessions().await, 2);
        assert_eq!(
            hub.session_state(latest.session).await,
            Some(SessionState::AwaitingDieType)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn count_prompt_times_out() {
        let (hub, mut rx) = hub_with(SessionConfig::default(), Arc::new(OsRandom::new()));
        let invitation = start(&hub, &mut rx).await;
        let msg = press(&hub, &mut rx, &invitation, "d6").await;
        let count_prompt = msg.prompt().unwrap().clone();

        tokio::time::sleep(Duration::from_secs(21)).await;
        assert_eq!(hub.session_state(count_prompt.session).await, None);
        assert_eq!(hub.active_sessions().await, 1);

        let option = count_prompt.option_for("3").unwrap();
        let result = hub
            .dispatch(count_prompt.interaction_for(option, ana()))
            .await;
        assert!(matches!(result, Err(SessionError::UnknownSession(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn answered_prompt_does_not_expire_session() {
        let config = SessionConfig::default().with_count_timeout(Duration::from_secs(5));
        let (hub, mut rx) = hub_with(config, Arc::new(OsRandom::new()));
        let invitation = start(&hub, &mut rx).await;
        let msg = press(&hub, &mut rx, &invitation, "d6").await;
        let session = msg.prompt().unwrap().session;
        press(&hub, &mut rx, msg.prompt().unwrap(), "1").await;

        // The count prompt's timer fires, but the decision prompt is active now.
        tokio::time::sleep(Duration::from_secs(6)).await;
        assert_eq!(
            hub.session_state(session).await,
            Some(SessionState::AwaitingPoolDecision)
        );

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(hub.session_state(session).await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn invitation_waits_indefinitely_by_default() {
        let (hub, mut rx) = hub_with(SessionConfig::default(), Arc::new(OsRandom::new()));
        let invitation = start(&hub, &mut rx).await;
        tokio::time::sleep(Duration::from_secs(86_400)).await;
        assert_eq!(
            hub.session_state(invitation.session).await,
            Some(SessionState::AwaitingDieType)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn invitation_timeout_retires_channel_invitation() {
        let config =
            SessionConfig::default().with_invitation_timeout(Some(Duration::from_secs(60)));
        let (hub, mut rx) = hub_with(config, Arc::new(OsRandom::new()));
        let invitation = start(&hub, &mut rx).await;

        tokio::time::sleep(Duration::from_secs(61)).await;
        assert_eq!(hub.session_state(invitation.session).await, None);
        assert_eq!(hub.active_sessions().await, 0);

        let again = start(&hub, &mut rx).await;
        assert_eq!(
            hub.session_state(again.session).await,
            Some(SessionState::AwaitingDieType)
        );
    }

    #[tokio::test]
    async fn entropy_failure_is_reported_and_retryable() {
        let (hub, mut rx) = hub_with(SessionConfig::default(), Arc::new(Flaky(StdMutex::new(1))));
        let invitation = start(&hub, &mut rx).await;
        let msg = press(&hub, &mut rx, &invitation, "d20").await;
        let decide = press(&hub, &mut rx, msg.prompt().unwrap(), "2").await;
        let decide = decide.prompt().unwrap().clone();

        let option = decide.option_for("roll").unwrap();
        let result = hub.dispatch(decide.interaction_for(option, ana())).await;
        assert!(matches!(result, Err(SessionError::Dice(_))));
        let notice = rx.recv().await.unwrap();
        assert!(!notice.is_public());
        assert!(notice.text().contains("device busy"));
        assert_eq!(
            hub.session_state(decide.session).await,
            Some(SessionState::AwaitingPoolDecision)
        );

        let summary = press(&hub, &mut rx, &decide, "roll").await;
        assert!(summary.text().contains("**2 × d20:** 20, 20 (subtotal: 40)"));
        assert!(summary.text().contains("Grand Total: 40"));
    }

    #[tokio::test]
    async fn disabled_hub_ignores_starts() {
        let config = SessionConfig::default().accepting(false);
        let (hub, mut rx) = hub_with(config, Arc::new(OsRandom::new()));
        hub.dispatch(Interaction::SessionStart {
            invoker: ana(),
            channel: ChannelId::new("tavern"),
        })
        .await
        .unwrap();
        assert!(rx.try_recv().is_err());
        assert_eq!(hub.active_sessions().await, 0);
    }

    #[tokio::test]
    async fn unknown_session_is_silent() {
        let (hub, mut rx) = hub_with(SessionConfig::default(), Arc::new(OsRandom::new()));
        let result = hub
            .dispatch(Interaction::PoolDecision {
                session: SessionId::generate(),
                prompt: PromptId::generate(),
                user: ana(),
                decision: Decision::RollNow,
            })
            .await;
        let err = result.unwrap_err();
        assert!(err.is_silent());
        assert!(rx.try_recv().is_err());
    }
}
