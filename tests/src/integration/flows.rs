//! # Integration Test Flows
//!
//! A controller schedules transactions through `BusTransportAdapter`; an
//! endpoint drains its inbox with a spawned `TransactionDispatcher`.
//!
//! ```text
//! [Controller] ──schedule──→ [BusTransportAdapter] ──deliver──→ [InMemoryTransport]
//!                                                                    │
//!                                                              EndpointInbox
//!                                                                    ↓
//!                                              [TransactionDispatcher] ──prepare/execute──→ [ActivityHost]
//! ```

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::*;
    use shared_bus::InMemoryTransport;
    use shared_types::{EndpointHandle, ScopeToken, TransportError};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::time::timeout;
    use txn_envelope::{
        BusTransportAdapter, ClientTransaction, DecodeError, DispatchError, EnvelopeConfigBuilder,
        ItemPosition, Metrics, Phase, ScheduleFailure, TargetState, TransactionApi,
        TransactionDispatcher, TransactionError, Transport,
    };
    use txn_telemetry::{init_logging, log_event, TelemetryConfig};

    type ActivityTransaction = ClientTransaction<dyn ActivityHandler>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    /// Bus, sending adapter and one live endpoint.
    struct Harness {
        bus: Arc<InMemoryTransport>,
        transport: BusTransportAdapter,
        metrics: Arc<Metrics>,
    }

    impl Harness {
        fn new() -> Self {
            // Only the first harness in the binary installs the subscriber
            let _ = init_logging(&TelemetryConfig::for_service("txn-tests"));
            log_event!(debug, "txn-tests", "harness started");

            let bus = Arc::new(InMemoryTransport::new());
            let metrics = Arc::new(Metrics::new());
            let transport = BusTransportAdapter::new(bus.clone()).with_metrics(metrics.clone());
            Self {
                bus,
                transport,
                metrics,
            }
        }

        /// Register an endpoint and spawn its dispatcher.
        fn spawn_endpoint(
            &self,
        ) -> anyhow::Result<(
            EndpointHandle,
            tokio::task::JoinHandle<TransactionDispatcher<dyn ActivityHandler>>,
        )> {
            let (handle, inbox) = self.bus.register_endpoint();
            let dispatcher = activity_dispatcher()?.with_metrics(self.metrics.clone());
            Ok((handle, tokio::spawn(dispatcher.run(inbox))))
        }

        /// Kill the endpoint and wait for its dispatcher to drain the inbox.
        async fn finish(
            &self,
            handle: EndpointHandle,
            task: tokio::task::JoinHandle<TransactionDispatcher<dyn ActivityHandler>>,
        ) -> anyhow::Result<TransactionDispatcher<dyn ActivityHandler>> {
            self.bus.kill_endpoint(handle);
            Ok(timeout(Duration::from_secs(5), task).await??)
        }
    }

    // =============================================================================
    // ORDERING SCENARIOS
    // =============================================================================

    /// Items [X, Y] and final state Z: each pass visits X, Y, Z.
    #[tokio::test]
    async fn test_items_then_final_state() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, task) = harness.spawn_endpoint()?;

        let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
        txn.add_item(configuration("X", 2))?;
        txn.add_item(intent("Y", "view"))?;
        txn.set_final_state(lifecycle("Z", ActivityState::Resumed));
        let receipt = txn.schedule(&harness.transport).await?;
        assert_eq!(receipt.item_count, 2);
        assert_eq!(receipt.final_state, Some(ActivityState::Resumed.code()));

        let dispatcher = harness.finish(endpoint, task).await?;
        let host = dispatcher.handler();

        assert_eq!(
            calls(host),
            vec!["X.prepare", "Y.prepare", "Z.prepare", "X.execute", "Y.execute", "Z.execute"]
        );
        assert_eq!(host.state_of(None), Some(ActivityState::Resumed));
        assert_eq!(host.density_of(None), Some(2));
        Ok(())
    }

    /// No items, final state Z only.
    #[tokio::test]
    async fn test_final_state_only() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, task) = harness.spawn_endpoint()?;

        let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
        txn.set_final_state(lifecycle("Z", ActivityState::Paused));
        txn.schedule(&harness.transport).await?;

        let dispatcher = harness.finish(endpoint, task).await?;

        assert_eq!(calls(dispatcher.handler()), vec!["Z.prepare", "Z.execute"]);
        assert_eq!(dispatcher.handler().state_of(None), Some(ActivityState::Paused));
        Ok(())
    }

    /// Items [X] and no final state: no lifecycle call happens.
    #[tokio::test]
    async fn test_items_without_final_state() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, task) = harness.spawn_endpoint()?;

        let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
        txn.add_item(intent("X", "share"))?;
        let receipt = txn.schedule(&harness.transport).await?;
        assert_eq!(receipt.final_state, None);

        let dispatcher = harness.finish(endpoint, task).await?;

        assert_eq!(calls(dispatcher.handler()), vec!["X.prepare", "X.execute"]);
        assert_eq!(dispatcher.handler().state_of(None), None);
        Ok(())
    }

    /// Transactions to one endpoint apply in the order they were scheduled.
    #[tokio::test]
    async fn test_back_to_back_transactions_keep_order() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, task) = harness.spawn_endpoint()?;

        for (i, state) in [ActivityState::Created, ActivityState::Resumed, ActivityState::Paused]
            .into_iter()
            .enumerate()
        {
            let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
            txn.add_item(configuration(&format!("cfg{i}"), i as u32 + 1))?;
            txn.set_final_state(lifecycle(&format!("life{i}"), state));
            txn.schedule(&harness.transport).await?;
        }

        let dispatcher = harness.finish(endpoint, task).await?;
        let host = dispatcher.handler();

        let executes: Vec<_> = calls(host)
            .into_iter()
            .filter(|c| c.ends_with(".execute"))
            .collect();
        assert_eq!(
            executes,
            vec![
                "cfg0.execute",
                "life0.execute",
                "cfg1.execute",
                "life1.execute",
                "cfg2.execute",
                "life2.execute"
            ]
        );
        assert_eq!(host.state_of(None), Some(ActivityState::Paused));
        assert_eq!(host.density_of(None), Some(3));
        Ok(())
    }

    // =============================================================================
    // SCOPE
    // =============================================================================

    /// An unset scope arrives unset, not as a zeroed token.
    #[tokio::test]
    async fn test_unset_scope_survives_delivery() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, mut inbox) = harness.bus.register_endpoint();

        let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
        txn.add_item(intent("X", "view"))?;
        txn.schedule(&harness.transport).await?;

        let frame = timeout(Duration::from_millis(100), inbox.recv())
            .await?
            .ok_or_else(|| anyhow::anyhow!("inbox closed"))?;
        let decoded = ClientTransaction::decode(&frame.payload, &activity_registry()?)?;

        assert_eq!(decoded.target(), endpoint);
        assert_eq!(decoded.scope(), None);
        Ok(())
    }

    /// A scoped transaction only touches its own activity.
    #[tokio::test]
    async fn test_scope_narrows_effects() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, task) = harness.spawn_endpoint()?;
        let first = ScopeToken::generate();
        let second = ScopeToken::generate();

        for (scope, state) in [(first, ActivityState::Resumed), (second, ActivityState::Paused)] {
            let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, Some(scope));
            txn.add_item(configuration("cfg", 4))?;
            txn.set_final_state(lifecycle("life", state));
            txn.schedule(&harness.transport).await?;
        }

        let dispatcher = harness.finish(endpoint, task).await?;
        let host = dispatcher.handler();

        assert_eq!(host.state_of(Some(&first)), Some(ActivityState::Resumed));
        assert_eq!(host.state_of(Some(&second)), Some(ActivityState::Paused));
        assert_eq!(host.state_of(None), None);
        assert!(host.journal()[..4].iter().all(|e| e.scope == Some(first)));
        assert!(host.journal()[4..].iter().all(|e| e.scope == Some(second)));
        Ok(())
    }

    // =============================================================================
    // TRANSPORT FAILURES
    // =============================================================================

    /// Scheduling to a dead endpoint fails, delivers nothing, and hands the
    /// transaction back unchanged.
    #[tokio::test]
    async fn test_schedule_to_dead_endpoint() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, inbox) = harness.bus.register_endpoint();
        drop(inbox);
        assert!(!harness.transport.is_reachable(endpoint));

        let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
        txn.add_item(configuration("X", 1))?;
        txn.add_item(intent("Y", "view"))?;
        txn.set_final_state(lifecycle("Z", ActivityState::Resumed));
        let before = txn.encode()?;

        let err = match txn.schedule(&harness.transport).await {
            Ok(receipt) => anyhow::bail!("delivered to a dead endpoint: {receipt:?}"),
            Err(err) => err,
        };

        assert_eq!(
            err.transport_error(),
            Some(&TransportError::Unreachable { target: endpoint })
        );
        assert_eq!(harness.bus.frames_delivered(), 0);
        assert_eq!(harness.metrics.snapshot().schedule_failures, 1);

        let txn = err.into_transaction();
        assert_eq!(txn.target(), endpoint);
        assert_eq!(txn.item_count(), 2);
        assert_eq!(
            txn.final_state().map(|r| r.target_state()),
            Some(ActivityState::Resumed.code())
        );
        assert_eq!(txn.encode()?, before);
        Ok(())
    }

    /// A full inbox refuses non-waiting delivery; `schedule` waits for room.
    #[tokio::test]
    async fn test_backpressure_is_transient() -> anyhow::Result<()> {
        let config = EnvelopeConfigBuilder::new().inbox_capacity(1).build()?;
        let bus = Arc::new(InMemoryTransport::with_capacity(config.inbox_capacity));
        let transport = BusTransportAdapter::new(bus.clone());
        let (endpoint, mut inbox) = bus.register_endpoint();
        bus.try_deliver(endpoint, vec![0])?;

        let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
        txn.set_final_state(lifecycle("Z", ActivityState::Resumed));

        // Inbox is full; a non-waiting delivery is refused
        let body = txn.encode()?;
        assert_eq!(
            bus.try_deliver(endpoint, body),
            Err(TransportError::Backpressure { target: endpoint })
        );

        inbox.recv().await;
        let receipt = txn.schedule(&transport).await?;
        assert_eq!(receipt.final_state, Some(TargetState(ActivityState::Resumed as u32)));
        assert!(inbox.recv().await.is_some());
        Ok(())
    }

    /// A closed transport refuses every endpoint.
    #[tokio::test]
    async fn test_closed_transport() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, _inbox) = harness.bus.register_endpoint();
        harness.bus.close();

        let txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
        let err = match txn.schedule(&harness.transport).await {
            Ok(_) => anyhow::bail!("closed transport accepted a frame"),
            Err(err) => err,
        };

        assert!(matches!(
            err.failure(),
            ScheduleFailure::Transport(TransportError::Closed)
        ));
        Ok(())
    }

    // =============================================================================
    // RECEIVER FAILURES
    // =============================================================================

    /// A failed item aborts its transaction only; the next one still runs.
    #[tokio::test]
    async fn test_failed_transaction_does_not_stop_dispatcher() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, task) = harness.spawn_endpoint()?;

        let mut bad: ActivityTransaction = ClientTransaction::new(endpoint, None);
        bad.add_item(configuration("bad", 0))?;
        bad.set_final_state(lifecycle("never", ActivityState::Destroyed));
        bad.schedule(&harness.transport).await?;

        let mut good: ActivityTransaction = ClientTransaction::new(endpoint, None);
        good.set_final_state(lifecycle("good", ActivityState::Resumed));
        good.schedule(&harness.transport).await?;

        let dispatcher = harness.finish(endpoint, task).await?;
        let host = dispatcher.handler();

        assert_eq!(calls(host), vec!["bad.prepare", "good.prepare", "good.execute"]);
        assert_eq!(host.state_of(None), Some(ActivityState::Resumed));
        let snapshot = harness.metrics.snapshot();
        assert_eq!(snapshot.item_failures, 1);
        assert_eq!(snapshot.envelopes_decoded, 2);
        Ok(())
    }

    /// Frames the registry cannot decode are skipped.
    #[tokio::test]
    async fn test_undecodable_frames_are_skipped() -> anyhow::Result<()> {
        let harness = Harness::new();
        let (endpoint, task) = harness.spawn_endpoint()?;

        harness.transport.send(endpoint, vec![0xde, 0xad]).await?;

        let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
        txn.add_item(intent("after", "view"))?;
        txn.schedule(&harness.transport).await?;

        let dispatcher = harness.finish(endpoint, task).await?;

        assert_eq!(calls(dispatcher.handler()), vec!["after.prepare", "after.execute"]);
        assert_eq!(harness.metrics.snapshot().decode_failures, 1);
        Ok(())
    }

    /// Synchronous dispatch reports where a transaction failed.
    #[test]
    fn test_dispatch_reports_failure_position() -> anyhow::Result<()> {
        let mut dispatcher = activity_dispatcher()?;
        let endpoint = EndpointHandle::generate();

        let mut destroy: ActivityTransaction = ClientTransaction::new(endpoint, None);
        destroy.set_final_state(lifecycle("destroy", ActivityState::Destroyed));
        dispatcher.dispatch(&destroy.encode()?)?;

        let mut resume: ActivityTransaction = ClientTransaction::new(endpoint, None);
        resume.add_item(intent("late", "view"))?;
        resume.set_final_state(lifecycle("resume", ActivityState::Resumed));
        let err = dispatcher.dispatch(&resume.encode()?);

        match err {
            Err(DispatchError::Transaction(TransactionError::ItemFailed {
                phase,
                position,
                tag,
                ..
            })) => {
                assert_eq!(phase, Phase::Execute);
                assert_eq!(position, ItemPosition::FinalState);
                assert_eq!(tag, "activity.lifecycle");
            }
            other => anyhow::bail!("unexpected outcome: {other:?}"),
        }
        assert_eq!(
            dispatcher.handler().state_of(None),
            Some(ActivityState::Destroyed)
        );
        Ok(())
    }

    // =============================================================================
    // LIMITS
    // =============================================================================

    /// A receiver with tighter limits refuses what the sender accepted.
    #[test]
    fn test_receiver_limits_apply() -> anyhow::Result<()> {
        let endpoint = EndpointHandle::generate();
        let mut txn: ActivityTransaction = ClientTransaction::new(endpoint, None);
        for i in 0..5 {
            txn.add_item(intent(&format!("i{i}"), "view"))?;
        }
        let body = txn.encode()?;

        let config = EnvelopeConfigBuilder::new().max_items(4).build()?;
        let mut registry = txn_envelope::ItemRegistry::<dyn ActivityHandler>::with_config(&config);
        registry.register_item::<NewIntent>()?;

        let err = match ClientTransaction::decode(&body, &registry) {
            Ok(_) => anyhow::bail!("decoded past the item limit"),
            Err(err) => err,
        };
        assert_eq!(err, DecodeError::TooManyItems { count: 5, max: 4 });
        Ok(())
    }
}
