//! Replay a capture file through the state engine.
//!
//! A capture holds one host message per line as JSON, for example:
//!
//! ```text
//! "ready"
//! {"event":{"kind":"connection_established","ucid":3,"user_name":"speedy"}}
//! {"event":{"kind":"participant_join","plid":7,"ucid":3}}
//! "lost"
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Requests the
//! engine sends are recorded by the replay host rather than delivered.
//! With position updates turned off, recorded position batches are dropped
//! once the link comes up.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::VecDeque;
use std::fmt;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::broadcast::error::TryRecvError;

use pitlane_state_client::{ClientConfig, Host, HostError, StateClient};
use pitlane_state_core::{BestLap, LinkFault};
use pitlane_state_types::{Event, HostMessage, StateRequest};

/// Run the replay command.
pub async fn run(capture: &Path, config: ClientConfig, quiet: bool) -> Result<()> {
    let text = tokio::fs::read_to_string(capture)
        .await
        .with_context(|| format!("Failed to read capture {}", capture.display()))?;
    let messages = parse_capture(&text)?;
    tracing::info!("Replaying {} messages from {}", messages.len(), capture.display());

    let mut stdout = std::io::stdout();
    let out: Option<&mut dyn Write> = if quiet { None } else { Some(&mut stdout) };
    let summary = replay(messages, config, out).await?;

    println!();
    print!("{summary}");
    Ok(())
}

/// Parse a capture into host messages, one per non-blank line.
pub fn parse_capture(text: &str) -> Result<Vec<HostMessage>> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(index, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("Invalid host message on line {}", index + 1))
        })
        .collect()
}

/// What the replica looked like once the capture ran out.
#[derive(Debug, Default)]
pub struct ReplaySummary {
    /// Messages fed to the engine.
    pub messages: usize,
    /// Notifications published.
    pub notifications: usize,
    /// State requests sent.
    pub requests: usize,
    /// Position batches dropped because position updates were off.
    pub positions_dropped: usize,
    /// Whether the replica was live at the end.
    pub ready: bool,
    /// Known connections at the end.
    pub connections: usize,
    /// Known participants at the end.
    pub participants: usize,
    /// Session best lap at the end.
    pub best_lap: Option<BestLap>,
    /// Broken connection/participant links at the end.
    pub link_faults: Vec<LinkFault>,
}

impl fmt::Display for ReplaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== replay summary ===")?;
        writeln!(f, "Messages:      {}", self.messages)?;
        writeln!(f, "Notifications: {}", self.notifications)?;
        writeln!(f, "Requests sent: {}", self.requests)?;
        if self.positions_dropped > 0 {
            writeln!(f, "Positions off: {} batches dropped", self.positions_dropped)?;
        }
        if !self.ready {
            return writeln!(f, "Session:       NOT READY");
        }
        writeln!(f, "Connections:   {}", self.connections)?;
        writeln!(f, "Participants:  {}", self.participants)?;
        match &self.best_lap {
            Some(best) => writeln!(
                f,
                "Best lap:      {} (participant {})",
                format_lap(best.time),
                best.plid
            )?,
            None => writeln!(f, "Best lap:      none")?,
        }
        writeln!(f, "Link faults:   {}", self.link_faults.len())?;
        for fault in &self.link_faults {
            writeln!(f, "  {:?}", fault)?;
        }
        Ok(())
    }
}

/// Format a lap time in milliseconds as `m:ss.mmm`.
fn format_lap(ms: u32) -> String {
    format!("{}:{:02}.{:03}", ms / 60_000, (ms / 1000) % 60, ms % 1000)
}

#[derive(Serialize)]
struct SentLine {
    request: StateRequest,
}

/// Feed messages through a client, writing one JSON line per notification
/// and per request to `out` when given.
pub async fn replay(
    messages: Vec<HostMessage>,
    config: ClientConfig,
    mut out: Option<&mut dyn Write>,
) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary {
        messages: messages.len(),
        ..ReplaySummary::default()
    };

    let client = StateClient::new(config, ReplayHost::new(messages));
    let mut rx = client.subscribe();

    while client.step().await? {
        loop {
            match rx.try_recv() {
                Ok(notification) => {
                    summary.notifications += 1;
                    if let Some(out) = out.as_deref_mut() {
                        writeln!(out, "{}", serde_json::to_string(&notification)?)?;
                    }
                }
                Err(TryRecvError::Lagged(missed)) => {
                    tracing::warn!("Output fell behind, {} notifications skipped", missed);
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }

        for request in client.host().take_sent() {
            summary.requests += 1;
            if let Some(out) = out.as_deref_mut() {
                writeln!(out, "{}", serde_json::to_string(&SentLine { request })?)?;
            }
        }
    }

    summary.positions_dropped = client.host().positions_dropped();

    let end_state = client
        .with_store(|store| {
            (
                store.connection_count(),
                store.participant_count(),
                store.best_lap().copied(),
                store.verify_links(),
            )
        })
        .await;
    if let Some((connections, participants, best_lap, link_faults)) = end_state {
        summary.ready = true;
        summary.connections = connections;
        summary.participants = participants;
        summary.best_lap = best_lap;
        summary.link_faults = link_faults;
    }

    Ok(summary)
}

/// Host that plays back a fixed list of messages and records requests.
struct ReplayHost {
    queue: Mutex<VecDeque<HostMessage>>,
    sent: Mutex<Vec<StateRequest>>,
    // The capture was recorded with positions on.
    positions: AtomicBool,
    positions_dropped: AtomicUsize,
}

impl ReplayHost {
    fn new(messages: Vec<HostMessage>) -> Self {
        Self {
            queue: Mutex::new(messages.into()),
            sent: Mutex::new(Vec::new()),
            positions: AtomicBool::new(true),
            positions_dropped: AtomicUsize::new(0),
        }
    }

    fn positions_dropped(&self) -> usize {
        self.positions_dropped.load(Ordering::Relaxed)
    }

    fn sent(&self) -> MutexGuard<'_, Vec<StateRequest>> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Take the requests recorded since the last call.
    fn take_sent(&self) -> Vec<StateRequest> {
        std::mem::take(&mut *self.sent())
    }
}

#[async_trait]
impl Host for ReplayHost {
    async fn recv(&self) -> Result<HostMessage, HostError> {
        let mut queue = self.queue.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match queue.pop_front() {
                Some(HostMessage::Event(Event::PositionBatch(_)))
                    if !self.positions.load(Ordering::Relaxed) =>
                {
                    self.positions_dropped.fetch_add(1, Ordering::Relaxed);
                }
                Some(message) => return Ok(message),
                None => return Err(HostError::Closed),
            }
        }
    }

    async fn send(&self, request: StateRequest) -> Result<(), HostError> {
        self.sent().push(request);
        Ok(())
    }

    async fn request_position_updates(&self, enabled: bool) -> Result<(), HostError> {
        self.positions.store(enabled, Ordering::Relaxed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pitlane_state_types::{Notification, Plid, Ucid};

    const CAPTURE: &str = r#"
# two drivers, one lap each
"ready"
{"event":{"kind":"connection_established","ucid":3,"user_name":"speedy"}}
{"event":{"kind":"connection_established","ucid":4,"user_name":"slowpoke"}}
{"event":{"kind":"participant_join","plid":7,"ucid":3}}
{"event":{"kind":"participant_join","plid":8,"ucid":4}}
{"event":{"kind":"lap_complete","plid":7,"lap_time":83456,"laps_done":1}}
{"event":{"kind":"lap_complete","plid":8,"lap_time":85000,"laps_done":1}}
"#;

    fn quick() -> ClientConfig {
        ClientConfig {
            request_spacing_ms: 0,
            ..ClientConfig::default()
        }
    }

    #[test]
    fn parses_messages_and_skips_comments() {
        let messages = parse_capture(CAPTURE).unwrap();
        assert_eq!(messages.len(), 7);
        assert_eq!(messages[0], HostMessage::Ready);
        assert!(matches!(
            &messages[3],
            HostMessage::Event(Event::ParticipantJoin(join)) if join.plid == Plid::new(7)
        ));
    }

    #[test]
    fn bad_line_is_reported_with_its_number() {
        let err = parse_capture("\"ready\"\n\n{\"event\":{\"kind\":\"bogus\"}}\n").unwrap_err();
        assert!(err.to_string().contains("line 3"));
    }

    #[tokio::test]
    async fn replay_builds_the_replica() {
        let messages = parse_capture(CAPTURE).unwrap();
        let mut out = Vec::new();

        let summary = replay(messages, quick(), Some(&mut out)).await.unwrap();

        assert!(summary.ready);
        assert_eq!(summary.messages, 7);
        assert_eq!(summary.connections, 2);
        assert_eq!(summary.participants, 2);
        assert_eq!(
            summary.best_lap,
            Some(BestLap {
                plid: Plid::new(7),
                time: 83_456
            })
        );
        assert!(summary.link_faults.is_empty());
        assert_eq!(summary.requests, 0);

        let text = String::from_utf8(out).unwrap();
        let first: Notification = serde_json::from_str(text.lines().next().unwrap()).unwrap();
        assert_eq!(first, Notification::Ready);
        assert_eq!(text.lines().count(), summary.notifications);
    }

    #[tokio::test]
    async fn desync_prints_notification_then_requests() {
        let capture = r#"
"ready"
{"event":{"kind":"participant_leave","plid":9}}
"#;
        let mut out = Vec::new();
        let summary = replay(parse_capture(capture).unwrap(), quick(), Some(&mut out))
            .await
            .unwrap();

        assert_eq!(summary.requests, 4);
        let lines: Vec<_> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(str::to_owned)
            .collect();
        assert_eq!(lines.len(), 6);
        assert!(lines[1].contains("out_of_sync"));
        assert_eq!(lines[2], r#"{"request":"session_state"}"#);
        assert_eq!(lines[5], r#"{"request":"layout"}"#);
    }

    #[tokio::test]
    async fn quiet_replay_still_counts() {
        let summary = replay(parse_capture(CAPTURE).unwrap(), quick(), None)
            .await
            .unwrap();
        assert!(summary.notifications > 0);
    }

    #[tokio::test]
    async fn lost_link_leaves_no_replica() {
        let capture = "\"ready\"\n{\"event\":{\"kind\":\"connection_established\",\"ucid\":1}}\n\"lost\"\n";
        let summary = replay(parse_capture(capture).unwrap(), quick(), None)
            .await
            .unwrap();
        assert!(!summary.ready);
        assert!(summary.to_string().contains("NOT READY"));
    }

    #[tokio::test]
    async fn run_reads_capture_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.jsonl");
        std::fs::write(&path, CAPTURE).unwrap();

        run(&path, quick(), true).await.unwrap();
        assert!(run(&dir.path().join("missing.jsonl"), quick(), true)
            .await
            .is_err());
    }

    #[tokio::test]
    async fn demo_capture_replays_cleanly() {
        let capture = include_str!("../../../demos/session.jsonl");
        let summary = replay(parse_capture(capture).unwrap(), quick(), None)
            .await
            .unwrap();

        assert!(summary.ready);
        assert_eq!(summary.connections, 2);
        assert_eq!(summary.participants, 2);
        assert_eq!(summary.best_lap.map(|b| b.time), Some(83_990));
        assert!(summary.link_faults.is_empty());
        assert_eq!(summary.positions_dropped, 0);
        // Version info resyncs once; the stray lap falls within the cool-down.
        assert_eq!(summary.requests, 4);
    }

    #[tokio::test]
    async fn positions_off_drops_position_batches() {
        let capture = include_str!("../../../demos/session.jsonl");
        let config = ClientConfig {
            request_position_updates: false,
            ..quick()
        };
        let summary = replay(parse_capture(capture).unwrap(), config, None)
            .await
            .unwrap();

        assert_eq!(summary.positions_dropped, 1);
        assert!(summary.ready);
        assert_eq!(summary.participants, 2);
        assert!(summary.to_string().contains("1 batches dropped"));
    }

    #[tokio::test]
    async fn positions_before_link_up_are_kept() {
        let capture = r#"
{"event":{"kind":"position_batch","cars":[]}}
"ready"
{"event":{"kind":"position_batch","cars":[]}}
"#;
        let config = ClientConfig {
            request_position_updates: false,
            ..quick()
        };
        let summary = replay(parse_capture(capture).unwrap(), config, None)
            .await
            .unwrap();
        assert_eq!(summary.positions_dropped, 1);
    }

    #[test]
    fn summary_formats_best_lap() {
        let summary = ReplaySummary {
            ready: true,
            best_lap: Some(BestLap {
                plid: Plid::new(7),
                time: 83_456,
            }),
            link_faults: vec![LinkFault::MissingOwner {
                plid: Plid::new(2),
                ucid: Ucid::new(5),
            }],
            ..ReplaySummary::default()
        };
        let text = summary.to_string();
        assert!(text.contains("1:23.456 (participant 7)"));
        assert!(text.contains("Link faults:   1"));
    }
}
