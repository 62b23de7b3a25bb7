// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.
//
// Copyright (c) DUSK NETWORK. All rights reserved.


use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nock_wallet::composer::{DISMISS_REFRESH_DELAY, SEND_REFRESH_DELAY};
use nock_wallet::currency;
use nock_wallet::{
    Action, AmountField, ComposerState, Error, ErrorKind, NoteName, Outcome,
    Session, SortKey, SortOrder, TransferForm, TxStatus, ValidationError,
};
use serde_json::json;

use mock::{MockGateway, ack, balance, created};

fn rpc_down() -> Error {
    Error::RpcUnavailable {
        message: "Cannot connect to Nockchain RPC".into(),
        details: Some("transport error: connection refused".into()),
    }
}

async fn loaded(gateway: MockGateway) -> Session<MockGateway> {
    let mut session = Session::new(gateway);
    session
        .dispatch(Action::Refresh)
        .await
        .expect("balance loads");
    session
}

#[tokio::test(flavor = "multi_thread")]
async fn empty_recipient_never_reaches_the_backend() {
    let mut session = Session::new(MockGateway::new());

    let form = TransferForm::new("", "5");
    let err = session
        .dispatch(Action::Compose(form))
        .await
        .expect_err("validation fails");

    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingRecipient)
    ));
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(session.gateway().calls().is_empty());
    assert_eq!(session.composer().state(), &ComposerState::Idle);
}

#[tokio::test(flavor = "multi_thread")]
async fn selected_note_locks_the_amount() {
    let gateway = MockGateway::new()
        .ok("balance", balance(&[("note-a", 655_360, 7)]))
        .ok("create_transaction", created("tx_a"));
    let mut session = loaded(gateway).await;

    let outcome = session
        .dispatch(Action::Select("note-a".into()))
        .await
        .expect("selection");
    let Outcome::Selection { total, amount } = outcome else {
        panic!("selection outcome expected");
    };
    assert_eq!(total, 655_360);
    assert_eq!(amount, AmountField::Locked(655_350));
    assert_eq!(amount.display().as_deref(), Some("9.9998"));

    let form = TransferForm::spend_selection("RECIPIENT");
    session
        .dispatch(Action::Compose(form))
        .await
        .expect("transfer created");

    let request = &session.gateway().created()[0];
    assert_eq!(request.amount_nock, 655_350.0 / 65_536.0);
    assert_eq!(request.fee, 10);
    assert!(request.use_all_funds);
    assert_eq!(request.selected_notes, Some(vec![NoteName::from("note-a")]));
}

#[tokio::test(flavor = "multi_thread")]
async fn fee_above_selection_is_refused() {
    let gateway = MockGateway::new().ok("balance", balance(&[("dust", 8, 1)]));
    let mut session = loaded(gateway).await;

    session
        .dispatch(Action::Select("dust".into()))
        .await
        .expect("selection");
    let err = session
        .dispatch(Action::Compose(TransferForm::spend_selection("R")))
        .await
        .expect_err("fee exceeds the selection");

    assert!(matches!(
        err,
        Error::Validation(ValidationError::FeeExceedsSelection { total: 8, fee: 10 })
    ));
    assert_eq!(session.gateway().calls(), ["balance"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn send_before_sign_is_rejected() {
    let gateway =
        MockGateway::new().ok("create_transaction", created("tx_a"));
    let mut session = Session::new(gateway);

    let err = session
        .dispatch(Action::Send)
        .await
        .expect_err("nothing to send");
    assert!(matches!(err, Error::NoPendingTransaction));

    session
        .dispatch(Action::Compose(TransferForm::new("R", "1")))
        .await
        .expect("transfer created");

    let err = session
        .dispatch(Action::Send)
        .await
        .expect_err("not signed yet");
    assert!(matches!(
        err,
        Error::InvalidTransition {
            action: "send",
            state: "created"
        }
    ));
    assert_eq!(err.to_string(), "Cannot send a transaction that is created");
    assert_eq!(session.gateway().calls(), ["create_transaction R"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn compose_sign_send_dismiss() {
    let gateway = MockGateway::new()
        .ok("balance", balance(&[("note-a", 131_072, 3), ("note-b", 65_536, 4)]))
        .ok("create_transaction", created("tx_a"))
        .ok("sign_transaction", ack())
        .ok("send_transaction", json!({ "success": true, "output": "sent" }))
        .ok("balance", balance(&[("note-b", 65_536, 4)]));
    let mut session = loaded(gateway).await;

    session.dispatch(Action::OpenComposer).await.expect("composer");
    session
        .dispatch(Action::Select("note-a".into()))
        .await
        .expect("selection");

    let outcome = session
        .dispatch(Action::Compose(TransferForm::spend_selection("R")))
        .await
        .expect("created");
    let Outcome::Created(tx) = outcome else {
        panic!("created outcome expected");
    };
    assert_eq!(tx.name, "tx_a");
    assert_eq!(tx.amount, 131_062);
    assert_eq!(tx.output.as_deref(), Some("created"));

    let outcome = session.dispatch(Action::Sign).await.expect("signed");
    assert!(matches!(outcome, Outcome::Signed(ref name) if name == "tx_a"));
    assert_eq!(session.composer().state().name(), "signed");
    assert!(!session.composer().was_sent());

    let outcome = session.dispatch(Action::Send).await.expect("sent");
    let Outcome::Sent {
        name,
        refresh_after,
    } = outcome
    else {
        panic!("sent outcome expected");
    };
    assert_eq!(name, "tx_a");
    assert_eq!(refresh_after, SEND_REFRESH_DELAY);
    assert!(session.composer().was_sent());
    assert!(session.view().selection().is_empty());
    let sent = session.composer().state().pending().expect("pending");
    assert_eq!(sent.output.as_deref(), Some("sent"));

    let outcome = session.dispatch(Action::Dismiss).await.expect("dismissed");
    assert!(matches!(
        outcome,
        Outcome::Dismissed {
            refresh_after: Some(DISMISS_REFRESH_DELAY)
        }
    ));
    assert!(!session.composer().was_sent());

    let snapshot = session
        .refresh_after(Duration::from_millis(1))
        .await
        .expect("refreshed");
    assert_eq!(snapshot.total_assets(), 65_536);

    assert_eq!(
        session.gateway().calls(),
        [
            "balance",
            "create_transaction R",
            "sign_transaction tx_a",
            "send_transaction tx_a",
            "balance"
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn failed_send_can_be_retried() {
    let gateway = MockGateway::new()
        .ok("balance", balance(&[("note-a", 131_072, 3)]))
        .ok("create_transaction", created("tx_a"))
        .ok("sign_transaction", ack())
        .fail("send_transaction", Error::backend("boom"))
        .ok("send_transaction", ack());
    let mut session = loaded(gateway).await;

    session.dispatch(Action::OpenComposer).await.expect("composer");
    session
        .dispatch(Action::Select("note-a".into()))
        .await
        .expect("selection");
    session
        .dispatch(Action::Compose(TransferForm::spend_selection("R")))
        .await
        .expect("created");
    session.dispatch(Action::Sign).await.expect("signed");

    let err = session
        .dispatch(Action::Send)
        .await
        .expect_err("send fails");
    assert_eq!(err.kind(), ErrorKind::Backend);
    assert_eq!(session.composer().state().name(), "signed");
    assert!(!session.composer().was_sent());
    assert!(session.view().selection().contains(&"note-a".into()));

    let outcome = session.dispatch(Action::Send).await.expect("retry sent");
    assert!(matches!(outcome, Outcome::Sent { ref name, .. } if name == "tx_a"));
    assert_eq!(session.composer().state().name(), "sent");
    assert!(session.composer().was_sent());
    assert!(session.view().selection().is_empty());
    assert_eq!(
        session
            .gateway()
            .calls()
            .iter()
            .filter(|c| c.starts_with("send_transaction"))
            .count(),
        2
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn confirm_stops_at_a_failed_signature() {
    let gateway = MockGateway::new()
        .ok("create_transaction", created("tx_a"))
        .fail("sign_transaction", Error::backend("Wallet is locked"))
        .ok("sign_transaction", ack())
        .ok("send_transaction", ack());
    let mut session = Session::new(gateway);

    session
        .dispatch(Action::Compose(TransferForm::new("R", "2.5")))
        .await
        .expect("created");

    let err = session
        .dispatch(Action::Confirm)
        .await
        .expect_err("signature fails");
    assert_eq!(err.kind(), ErrorKind::Backend);
    assert_eq!(err.to_string(), "Backend error: Wallet is locked");
    assert_eq!(session.composer().state().name(), "created");

    // retrying from the created state goes all the way
    let outcome = session.dispatch(Action::Confirm).await.expect("sent");
    assert!(matches!(outcome, Outcome::Sent { ref name, .. } if name == "tx_a"));
    assert_eq!(session.composer().state().name(), "sent");
    assert_eq!(
        session.gateway().calls(),
        [
            "create_transaction R",
            "sign_transaction tx_a",
            "sign_transaction tx_a",
            "send_transaction tx_a"
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn compose_twice_is_rejected() {
    let gateway =
        MockGateway::new().ok("create_transaction", created("tx_a"));
    let mut session = Session::new(gateway);

    let form = TransferForm::new("R", "1");
    session
        .dispatch(Action::Compose(form.clone()))
        .await
        .expect("created");
    let err = session
        .dispatch(Action::Compose(form))
        .await
        .expect_err("already created");
    assert!(matches!(
        err,
        Error::InvalidTransition {
            action: "create",
            state: "created"
        }
    ));

    // dismissing without a send schedules nothing
    let outcome = session.dispatch(Action::Dismiss).await.expect("dismissed");
    assert!(matches!(
        outcome,
        Outcome::Dismissed {
            refresh_after: None
        }
    ));
}

#[tokio::test(flavor = "multi_thread")]
async fn refresh_clears_the_selection() {
    let gateway = MockGateway::new()
        .ok("balance", balance(&[("note-a", 100, 1), ("note-b", 200, 2)]))
        .ok("balance", balance(&[("note-a", 100, 1), ("note-b", 200, 2)]));
    let mut session = loaded(gateway).await;

    let last_total = Arc::new(AtomicU64::new(u64::MAX));
    let notified = Arc::new(AtomicUsize::new(0));
    {
        let last_total = last_total.clone();
        let notified = notified.clone();
        session.view_mut().subscribe(move |total| {
            last_total.store(total, Ordering::SeqCst);
            notified.fetch_add(1, Ordering::SeqCst);
        });
    }

    session
        .dispatch(Action::Select("note-a".into()))
        .await
        .expect("selection");
    session
        .dispatch(Action::Select("note-b".into()))
        .await
        .expect("selection");
    assert_eq!(last_total.load(Ordering::SeqCst), 300);

    session.dispatch(Action::Refresh).await.expect("refreshed");
    assert!(session.view().selection().is_empty());
    assert_eq!(last_total.load(Ordering::SeqCst), 0);
    assert_eq!(notified.load(Ordering::SeqCst), 3);
}

#[tokio::test(flavor = "multi_thread")]
async fn rpc_failure_empties_the_view() {
    let gateway = MockGateway::new()
        .ok("balance", balance(&[("note-a", 100, 1)]))
        .fail("balance", rpc_down());
    let mut session = loaded(gateway).await;
    assert_eq!(session.view().snapshot().total_assets(), 100);

    let err = session
        .dispatch(Action::Refresh)
        .await
        .expect_err("rpc is down");

    assert_eq!(err.kind(), ErrorKind::RpcUnavailable);
    assert_eq!(err.details(), Some("transport error: connection refused"));
    assert!(session.view().snapshot().is_empty());
    assert_eq!(session.view().snapshot().total_assets(), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn notes_sorted_for_display() {
    let gateway = MockGateway::new().ok(
        "balance",
        balance(&[("a", 300, 5), ("b", 100, 9), ("c", 200, 5)]),
    );
    let session = loaded(gateway).await;

    let names = |key, order| -> Vec<String> {
        session
            .view()
            .sorted(key, order)
            .iter()
            .map(|note| note.name.to_string())
            .collect()
    };

    assert_eq!(names(SortKey::BlockHeight, SortOrder::Desc), ["b", "a", "c"]);
    assert_eq!(names(SortKey::BlockHeight, SortOrder::Asc), ["a", "c", "b"]);
    assert_eq!(names(SortKey::Value, SortOrder::Desc), ["a", "c", "b"]);

    // the snapshot keeps the backend order
    let stored: Vec<_> = session
        .view()
        .snapshot()
        .iter()
        .map(|note| note.name.to_string())
        .collect();
    assert_eq!(stored, ["a", "b", "c"]);
}

#[tokio::test(flavor = "multi_thread")]
async fn switching_address_replaces_the_notes() {
    let gateway = MockGateway::new()
        .ok("balance", balance(&[("old", 500, 1)]))
        .ok(
            "master_addresses",
            json!({ "addresses": [
                { "address": "ADDR1", "version": 0, "is_active": true },
                { "address": "ADDR2", "version": 1, "is_active": false }
            ]}),
        )
        .ok(
            "set_active_address",
            json!({
                "success": true,
                "active_address": "ADDR2",
                "version": 1,
                "balance": balance(&[("new", 65_536, 40)])
            }),
        );
    let mut session = loaded(gateway).await;
    session.dispatch(Action::LoadAddresses).await.expect("listing");
    session
        .dispatch(Action::Select("old".into()))
        .await
        .expect("selection");

    let outcome = session
        .dispatch(Action::SetActiveAddress(" ADDR2 ".into()))
        .await
        .expect("switched");
    let Outcome::AddressChanged { address, snapshot } = outcome else {
        panic!("address change expected");
    };

    assert_eq!(address, "ADDR2");
    assert_eq!(snapshot.map(|s| s.total_assets()), Some(65_536));
    assert!(session.view().selection().is_empty());
    assert!(session.view().snapshot().get(&"old".into()).is_none());
    assert_eq!(
        session.addresses().active().map(|a| a.value.as_str()),
        Some("ADDR2")
    );
    assert_eq!(
        session.gateway().calls().last().map(String::as_str),
        Some("set_active_address ADDR2")
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn switching_address_with_a_failed_balance() {
    let gateway = MockGateway::new()
        .ok("balance", balance(&[("old", 500, 1)]))
        .ok(
            "set_active_address",
            json!({
                "active_address": "ADDR2",
                "balance": {
                    "error": "Cannot connect to Nockchain RPC",
                    "is_rpc_error": true
                }
            }),
        );
    let mut session = loaded(gateway).await;

    let outcome = session
        .dispatch(Action::SetActiveAddress("ADDR2".into()))
        .await
        .expect("switched");

    assert!(matches!(
        outcome,
        Outcome::AddressChanged { snapshot: None, .. }
    ));
    assert!(session.view().snapshot().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_address_is_refused() {
    let mut session = Session::new(MockGateway::new());

    let err = session
        .dispatch(Action::SetActiveAddress("   ".into()))
        .await
        .expect_err("no address");

    assert!(matches!(
        err,
        Error::Validation(ValidationError::MissingAddress)
    ));
    assert!(session.gateway().calls().is_empty());
}

#[tokio::test(flavor = "multi_thread")]
async fn history_drives_sign_and_send() {
    let gateway = MockGateway::new()
        .ok(
            "transaction_history",
            json!({ "transactions": [
                { "transaction_name": "tx_a", "status": "created",
                  "recipient": "R", "amount": 65_536 },
                { "transaction_name": "tx_b", "status": "broadcasted",
                  "transaction_hash": "abcd" }
            ]}),
        )
        .ok("sign_transaction", ack())
        .ok("send_transaction", ack());
    let mut session = Session::new(gateway);

    let outcome = session
        .dispatch(Action::LoadHistory)
        .await
        .expect("history");
    let Outcome::History(records) = outcome else {
        panic!("history expected");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].display_amount().as_deref(), Some("1.0000"));

    let err = session
        .dispatch(Action::SendExisting("tx_a".into()))
        .await
        .expect_err("not signed yet");
    assert!(matches!(
        err,
        Error::InvalidTransition {
            action: "send",
            state: "created"
        }
    ));

    let err = session
        .dispatch(Action::SignExisting("tx_b".into()))
        .await
        .expect_err("already broadcast");
    assert!(matches!(
        err,
        Error::InvalidTransition {
            action: "sign",
            state: "broadcasted"
        }
    ));

    session
        .dispatch(Action::SignExisting("tx_a".into()))
        .await
        .expect("signed");
    assert_eq!(session.history()[0].status, TxStatus::Signed);

    let outcome = session
        .dispatch(Action::SendExisting("tx_a".into()))
        .await
        .expect("sent");
    assert!(matches!(
        outcome,
        Outcome::Sent { refresh_after, .. } if refresh_after == SEND_REFRESH_DELAY
    ));
    assert_eq!(session.history()[0].status, TxStatus::Sent);

    assert_eq!(
        session.gateway().calls(),
        [
            "transaction_history",
            "sign_transaction tx_a",
            "send_transaction tx_a"
        ]
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn fee_changes_the_locked_amount() {
    let gateway =
        MockGateway::new().ok("balance", balance(&[("note-a", 1_000, 1)]));
    let mut session = loaded(gateway).await;
    session
        .dispatch(Action::Select("note-a".into()))
        .await
        .expect("selection");

    let outcome = session
        .dispatch(Action::SetFee(Some(100)))
        .await
        .expect("fee");
    assert!(matches!(
        outcome,
        Outcome::Composer(AmountField::Locked(900))
    ));

    let outcome = session.dispatch(Action::SetFee(None)).await.expect("fee");
    assert!(matches!(
        outcome,
        Outcome::Composer(AmountField::Locked(990))
    ));
    assert_eq!(currency::to_display_unit(990), "0.0151");
}
