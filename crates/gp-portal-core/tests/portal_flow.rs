mod support;

use std::rc::Rc;

use gp_api_types::{ACCOUNT_BASE, ACCOUNT_USER, APPEND_INSTRUCTION, INITIALIZE_INSTRUCTION, WalletAddress};
use gp_ledger_client::{AccountFetch, LedgerError};
use gp_portal_core::{DetectOutcome, Portal, PortalError, RemoteList, SubmitOutcome, View};
use gp_wallet::WalletError;
use serde_json::json;
use support::{BASE, MockWallet, ScriptedLedger, found, signature};

fn build(wallet: MockWallet, ledger: ScriptedLedger) -> (Portal<MockWallet, ScriptedLedger>, Rc<ScriptedLedger>) {
    let ledger = Rc::new(ledger);
    let portal = Portal::new(Rc::new(wallet), ledger.clone(), BASE.into());
    (portal, ledger)
}

fn sources(view: &View) -> Vec<String> {
    match view {
        View::Gallery { tiles, .. } => tiles.iter().map(|tile| tile.src.clone()).collect(),
        other => panic!("expected the gallery, got {other:?}"),
    }
}

#[tokio::test]
async fn connect_initialize_and_submit() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::default()
        .on_fetch(Ok(AccountFetch::NotFound))
        .on_submit(signature("init-sig"))
        .on_fetch(found(&["https://x/a.gif"]))
        .on_submit(signature("add-sig"))
        .on_fetch(found(&["https://x/a.gif", "https://x/b.gif"]));
    let (portal, ledger) = build(MockWallet::approving("ABC123"), ledger);

    assert_eq!(portal.view(), View::Connect);

    let address = portal.connect().await?;
    assert_eq!(address, WalletAddress::from("ABC123"));
    assert_eq!(portal.snapshot().address(), Some(&address));
    assert_eq!(portal.view(), View::Initialize { address: address.clone() });

    let sig = portal.initialize().await?;
    assert_eq!(sig.0, "init-sig");
    assert_eq!(sources(&portal.view()), ["https://x/a.gif"]);

    portal.set_input("https://x/b.gif");
    assert_eq!(portal.submit().await, SubmitOutcome::Sent(signature("add-sig")?));
    assert_eq!(portal.snapshot().input_value, "");
    assert_eq!(sources(&portal.view()), ["https://x/a.gif", "https://x/b.gif"]);

    assert_eq!(ledger.fetch_count(), 3);
    assert!(ledger.fetched.borrow().iter().all(|account| account.address.0 == BASE));
    Ok(())
}

#[tokio::test]
async fn instructions_name_the_shared_account_and_the_user() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::default()
        .on_fetch(Ok(AccountFetch::NotFound))
        .on_submit(signature("init-sig"))
        .on_fetch(found(&[]))
        .on_submit(signature("add-sig"))
        .on_fetch(found(&["https://x/a.gif"]));
    let (portal, ledger) = build(MockWallet::approving("ABC123"), ledger);

    portal.connect().await?;
    portal.initialize().await?;
    portal.set_input("https://x/a.gif");
    portal.submit().await;

    let submitted = ledger.submitted.borrow();
    let init = &submitted[0];
    assert_eq!(init.name, INITIALIZE_INSTRUCTION);
    assert_eq!(init.payer.0, "ABC123");
    assert_eq!(init.account_address(ACCOUNT_BASE)?.0, BASE);
    assert_eq!(init.signers, [WalletAddress::from(BASE)]);
    assert!(init.args.is_empty());

    let add = &submitted[1];
    assert_eq!(add.name, APPEND_INSTRUCTION);
    assert_eq!(add.account_address(ACCOUNT_USER)?.0, "ABC123");
    assert!(add.signers.is_empty());
    assert_eq!(add.args, [json!("https://x/a.gif")]);
    Ok(())
}

#[tokio::test]
async fn empty_input_sends_nothing() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::default().on_fetch(found(&["https://x/a.gif"]));
    let (portal, ledger) = build(MockWallet::approving("ABC123"), ledger);
    portal.connect().await?;
    let before = portal.snapshot();

    assert_eq!(portal.submit().await, SubmitOutcome::Skipped);
    assert_eq!(portal.snapshot(), before);
    assert_eq!(ledger.submit_count(), 0);
    assert_eq!(ledger.fetch_count(), 1);
    Ok(())
}

#[tokio::test]
async fn submit_without_wallet_is_skipped() {
    let (portal, ledger) = build(MockWallet::approving("ABC123"), ScriptedLedger::default());
    portal.set_input("https://x/a.gif");

    assert_eq!(portal.submit().await, SubmitOutcome::Skipped);
    assert_eq!(portal.snapshot().input_value, "https://x/a.gif");
    assert_eq!(ledger.submit_count(), 0);
    assert_eq!(ledger.fetch_count(), 0);
}

#[tokio::test]
async fn input_is_cleared_whatever_the_submit_result() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::default()
        .on_fetch(found(&[]))
        .on_submit(Err(LedgerError::Rejected("custom program error: 0x1".to_owned())))
        .on_submit(signature("add-sig"))
        .on_fetch(found(&["https://x/b.gif"]));
    let (portal, ledger) = build(MockWallet::approving("ABC123"), ledger);
    portal.connect().await?;

    portal.set_input("https://x/a.gif");
    let outcome = portal.submit().await;
    assert!(matches!(outcome, SubmitOutcome::Failed(ref reason) if reason.contains("0x1")));
    assert_eq!(portal.snapshot().input_value, "");
    assert_eq!(ledger.fetch_count(), 1, "a failed submit does not refetch");
    assert!(sources(&portal.view()).is_empty());

    portal.set_input("https://x/b.gif");
    assert!(matches!(portal.submit().await, SubmitOutcome::Sent(_)));
    assert_eq!(portal.snapshot().input_value, "");
    Ok(())
}

#[tokio::test]
async fn fetch_failure_is_not_mistaken_for_missing_account() -> anyhow::Result<()> {
    let ledger = ScriptedLedger::default()
        .on_fetch(Err(LedgerError::Transport("connection refused".to_owned())))
        .on_fetch(Ok(AccountFetch::NotFound));
    let (portal, _ledger) = build(MockWallet::approving("ABC123"), ledger);

    portal.connect().await?;
    let unavailable = portal.snapshot();
    assert!(matches!(
        unavailable.list(),
        Some(RemoteList::Unavailable { reason }) if reason.contains("connection refused")
    ));
    assert!(matches!(portal.view(), View::Unavailable { .. }));

    portal.fetch().await;
    let uninitialized = portal.snapshot();
    assert_eq!(uninitialized.list(), Some(&RemoteList::Uninitialized));
    assert_ne!(unavailable, uninitialized);
    assert_ne!(
        gp_portal_core::render(&unavailable),
        gp_portal_core::render(&uninitialized)
    );
    Ok(())
}

#[tokio::test]
async fn connect_failure_is_reported_and_leaves_state_alone() {
    let (portal, ledger) = build(MockWallet::rejecting(), ScriptedLedger::default());

    let err = portal.connect().await.unwrap_err();
    assert!(matches!(err, PortalError::Wallet(WalletError::Rejected(_))));
    assert_eq!(portal.view(), View::Connect);
    assert_eq!(ledger.fetch_count(), 0);
}

#[tokio::test]
async fn initialize_requires_a_wallet_and_reports_ledger_errors() -> anyhow::Result<()> {
    let (portal, ledger) = build(MockWallet::approving("ABC123"), ScriptedLedger::default());
    assert_eq!(portal.initialize().await, Err(PortalError::NotConnected));
    assert_eq!(ledger.submit_count(), 0);

    let ledger = ScriptedLedger::default()
        .on_fetch(Ok(AccountFetch::NotFound))
        .on_submit(Err(LedgerError::Unconfirmed(gp_api_types::TxSignature("slow".to_owned()))));
    let (portal, ledger) = build(MockWallet::approving("ABC123"), ledger);
    portal.connect().await?;

    let err = portal.initialize().await.unwrap_err();
    assert!(matches!(err, PortalError::Ledger(LedgerError::Unconfirmed(_))));
    assert_eq!(ledger.fetch_count(), 1);
    assert!(matches!(portal.view(), View::Initialize { .. }));
    Ok(())
}

#[tokio::test]
async fn load_detects_wallet_and_reconnects_when_trusted() {
    let (portal, _) = build(MockWallet::absent(), ScriptedLedger::default());
    assert_eq!(portal.on_load().await, DetectOutcome::Missing);
    assert_eq!(portal.view(), View::Connect);

    let wallet = MockWallet::approving("ABC123");
    let (portal, ledger) = build(wallet, ScriptedLedger::default());
    assert_eq!(portal.on_load().await, DetectOutcome::Present);
    assert_eq!(portal.view(), View::Connect);
    assert_eq!(ledger.fetch_count(), 0);

    let ledger = ScriptedLedger::default().on_fetch(found(&["https://x/a.gif"]));
    let (portal, ledger) = build(MockWallet::trusting("ABC123"), ledger);
    assert_eq!(
        portal.on_load().await,
        DetectOutcome::Reconnected("ABC123".into())
    );
    assert_eq!(ledger.fetch_count(), 1);
    assert_eq!(sources(&portal.view()), ["https://x/a.gif"]);
}
