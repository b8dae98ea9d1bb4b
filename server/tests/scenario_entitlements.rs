//! Validated-pack resolution, pricing, billing and ticket entitlements.

mod common;

use common::Fixture;
use partners_server::engine::billing::{BillingInput, IssueTickets, TicketUpdate};
use partners_server::engine::documents::DocumentKind;
use partners_server::engine::suggestion::SuggestPack;
use partners_server::models::{
    BillingContact, InvoiceStatus, OptionSelection, PackSource, TicketHolder,
};
use partners_server::utils::error::AppError;
use rust_decimal::Decimal;
use uuid::Uuid;

fn billing_input() -> BillingInput {
    BillingInput {
        name: None,
        contact: BillingContact {
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "billing@acme.example".into(),
        },
        po: Some("PO-2025-001".into()),
    }
}

fn holders(ids: &[&str]) -> IssueTickets {
    IssueTickets {
        order_id: "order-42".into(),
        holders: ids
            .iter()
            .map(|id| TicketHolder {
                ticket_id: id.to_string(),
                first_name: "Guest".into(),
                last_name: id.to_string(),
            })
            .collect(),
    }
}

#[tokio::test]
async fn approved_suggestion_drives_pricing_tickets_and_documents() {
    let f = Fixture::new();
    let partnership = f.register(f.acme, f.silver, vec![]).await.unwrap();

    f.engine
        .suggest(
            f.event_id,
            f.acme,
            partnership.id,
            SuggestPack {
                pack_id: f.gold,
                language: "fr".into(),
                option_selections: vec![OptionSelection::Text { option_id: f.stand }],
            },
        )
        .await
        .unwrap();

    // Not validated and not yet approved: nothing to price.
    let err = f.engine.pricing(f.event_id, partnership.id).await.unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");

    f.engine
        .approve_suggestion(f.event_id, f.acme, partnership.id)
        .await
        .unwrap();

    let pricing = f.engine.pricing(f.event_id, partnership.id).await.unwrap();
    assert_eq!(pricing.pack_id, f.gold);
    assert_eq!(pricing.source, PackSource::Suggestion);
    assert_eq!(pricing.amount, Decimal::new(205000, 0));

    let snapshot = f
        .engine
        .document_snapshot(f.event_id, partnership.id, DocumentKind::Agreement)
        .await
        .unwrap();
    assert_eq!(snapshot.partnership.pack_name, "Gold");
    assert_eq!(snapshot.partnership.amount, Decimal::new(205000, 0));
    assert_eq!(snapshot.partnership.options, vec!["Logo", "Stand"]);

    // Gold grants five tickets where Silver grants two.
    f.engine
        .upsert_billing(f.event_id, partnership.id, billing_input())
        .await
        .unwrap();
    f.engine
        .update_billing_status(f.event_id, partnership.id, InvoiceStatus::Paid)
        .await
        .unwrap();
    let issued = f
        .engine
        .issue_tickets(f.event_id, partnership.id, holders(&["t1", "t2", "t3"]))
        .await
        .unwrap();
    assert_eq!(issued.len(), 3);
}

#[tokio::test]
async fn declined_suggestion_falls_back_to_validated_selection() {
    let f = Fixture::new();
    let partnership = f.validated(f.acme, f.silver).await;

    f.engine
        .suggest(
            f.event_id,
            f.acme,
            partnership.id,
            SuggestPack {
                pack_id: f.gold,
                language: "fr".into(),
                option_selections: vec![],
            },
        )
        .await
        .unwrap();
    f.engine
        .decline_suggestion(f.event_id, f.acme, partnership.id)
        .await
        .unwrap();

    let pricing = f.engine.pricing(f.event_id, partnership.id).await.unwrap();
    assert_eq!(pricing.pack_id, f.silver);
    assert_eq!(pricing.source, PackSource::Selection);
    assert_eq!(pricing.amount, Decimal::new(105000, 0));
}

#[tokio::test]
async fn suggestion_answer_requires_a_suggestion_and_matching_company() {
    let f = Fixture::new();
    let partnership = f.register(f.acme, f.silver, vec![]).await.unwrap();

    let err = f
        .engine
        .approve_suggestion(f.event_id, f.acme, partnership.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");

    let err = f
        .engine
        .suggest(
            f.event_id,
            f.globex,
            partnership.id,
            SuggestPack {
                pack_id: f.gold,
                language: "fr".into(),
                option_selections: vec![],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn suggested_option_price_counts_toward_amount() {
    let f = Fixture::new();
    let partnership = f.register(f.acme, f.gold, vec![]).await.unwrap();

    f.engine
        .suggest(
            f.event_id,
            f.acme,
            partnership.id,
            SuggestPack {
                pack_id: f.silver,
                language: "fr".into(),
                option_selections: vec![OptionSelection::Text { option_id: f.stand }],
            },
        )
        .await
        .unwrap();
    f.engine
        .approve_suggestion(f.event_id, f.acme, partnership.id)
        .await
        .unwrap();

    let pricing = f.engine.pricing(f.event_id, partnership.id).await.unwrap();
    assert_eq!(pricing.base_price, Decimal::new(100000, 0));
    assert_eq!(pricing.options.len(), 1);
    assert_eq!(pricing.options[0].effective_price, Some(Decimal::new(5000, 0)));
    assert_eq!(pricing.amount, Decimal::new(105000, 0));
}

#[tokio::test]
async fn pack_price_override_applies_and_clears() {
    let f = Fixture::new();
    let partnership = f.register(f.acme, f.silver, vec![]).await.unwrap();

    // No validated pack yet.
    let err = f
        .engine
        .set_pack_price(f.event_id, partnership.id, Some(Decimal::new(150000, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)), "{err:?}");
    assert!(f
        .engine
        .set_pack_price(f.event_id, partnership.id, None)
        .await
        .unwrap()
        .is_none());

    f.engine.validate(f.event_id, partnership.id).await.unwrap();
    let before = f.engine.pricing(f.event_id, partnership.id).await.unwrap();
    assert_eq!(before.amount, Decimal::new(100000, 0));

    for _ in 0..2 {
        let pricing = f
            .engine
            .set_pack_price(f.event_id, partnership.id, Some(Decimal::new(150000, 0)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pricing.amount, Decimal::new(150000, 0));
    }

    let err = f
        .engine
        .set_pack_price(f.event_id, partnership.id, Some(Decimal::new(-1, 0)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)));

    let cleared = f
        .engine
        .set_pack_price(f.event_id, partnership.id, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(cleared, before);
}

#[tokio::test]
async fn option_price_override_targets_validated_selection() {
    let f = Fixture::new();
    let partnership = f.validated(f.acme, f.silver).await;

    let pricing = f
        .engine
        .set_option_price(f.event_id, partnership.id, f.stand, Some(Decimal::ZERO))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pricing.amount, Decimal::new(100000, 0));

    let err = f
        .engine
        .set_option_price(f.event_id, partnership.id, f.goodies, Some(Decimal::ONE))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");

    let pricing = f
        .engine
        .set_option_price(f.event_id, partnership.id, f.stand, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(pricing.amount, Decimal::new(105000, 0));
}

#[tokio::test]
async fn tickets_require_paid_invoice_and_respect_quota() {
    let f = Fixture::new();
    let partnership = f.validated(f.acme, f.silver).await;

    let err = f
        .engine
        .issue_tickets(f.event_id, partnership.id, holders(&["t1"]))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");

    let billing = f
        .engine
        .upsert_billing(f.event_id, partnership.id, billing_input())
        .await
        .unwrap();
    assert_eq!(billing.status, InvoiceStatus::Pending);
    assert_eq!(billing.name, "Acme");

    let err = f
        .engine
        .issue_tickets(f.event_id, partnership.id, holders(&["t1"]))
        .await
        .unwrap_err();
    assert!(
        matches!(err, AppError::Forbidden(ref m) if m == "Invoice status PENDING is not PAID"),
        "{err:?}"
    );

    f.engine
        .update_billing_status(f.event_id, partnership.id, InvoiceStatus::Paid)
        .await
        .unwrap();
    let issued = f
        .engine
        .issue_tickets(f.event_id, partnership.id, holders(&["t1"]))
        .await
        .unwrap();
    assert_eq!(issued[0].email, "billing@acme.example");
    assert_eq!(issued[0].order_id, "order-42");

    let err = f
        .engine
        .issue_tickets(f.event_id, partnership.id, holders(&["t2", "t3"]))
        .await
        .unwrap_err();
    assert!(
        matches!(err, AppError::Forbidden(ref m) if m.ends_with("1 available, 2 requested")),
        "{err:?}"
    );

    let tickets = f.engine.list_tickets(f.event_id, partnership.id).await.unwrap();
    assert_eq!(tickets.len(), 1);
}

#[tokio::test]
async fn ticket_update_corrects_names_of_issued_tickets_only() {
    let f = Fixture::new();
    let partnership = f.validated(f.acme, f.silver).await;
    f.engine
        .upsert_billing(f.event_id, partnership.id, billing_input())
        .await
        .unwrap();
    f.engine
        .update_billing_status(f.event_id, partnership.id, InvoiceStatus::Paid)
        .await
        .unwrap();
    f.engine
        .issue_tickets(f.event_id, partnership.id, holders(&["t1"]))
        .await
        .unwrap();

    let rename = || TicketUpdate {
        first_name: "Grace".into(),
        last_name: "Hopper".into(),
    };
    for _ in 0..2 {
        let ticket = f
            .engine
            .update_ticket(f.event_id, partnership.id, "t1", rename())
            .await
            .unwrap();
        assert_eq!(ticket.first_name, "Grace");
    }
    let err = f
        .engine
        .update_ticket(f.event_id, partnership.id, "external-7", rename())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)), "{err:?}");

    let tickets = f.engine.list_tickets(f.event_id, partnership.id).await.unwrap();
    assert_eq!(tickets.len(), 1);
    assert_eq!(tickets[0].last_name, "Hopper");
}

#[tokio::test]
async fn ticket_update_cannot_create_tickets_on_a_pending_partnership() {
    let f = Fixture::new();
    let partnership = f.register(f.acme, f.silver, vec![]).await.unwrap();

    for id in ["x1", "x2", "x3"] {
        let err = f
            .engine
            .update_ticket(
                f.event_id,
                partnership.id,
                id,
                TicketUpdate {
                    first_name: "Grace".into(),
                    last_name: "Hopper".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)), "{err:?}");
    }

    assert!(f.partnerships().await[0].tickets.is_empty());
}

#[tokio::test]
async fn concurrent_issuance_cannot_exceed_capacity() {
    let f = Fixture::new();
    let partnership = f.validated(f.acme, f.silver).await;
    f.engine
        .upsert_billing(f.event_id, partnership.id, billing_input())
        .await
        .unwrap();
    f.engine
        .update_billing_status(f.event_id, partnership.id, InvoiceStatus::Paid)
        .await
        .unwrap();

    let engine = f.interleaving_engine();
    let (a, b) = tokio::join!(
        engine.issue_tickets(f.event_id, partnership.id, holders(&["a1", "a2"])),
        engine.issue_tickets(f.event_id, partnership.id, holders(&["b1", "b2"])),
    );

    let (issued, refused): (Vec<_>, Vec<_>) = [a, b].into_iter().partition(Result::is_ok);
    assert_eq!(issued.len(), 1);
    let err = refused.into_iter().next().unwrap().unwrap_err();
    assert!(
        matches!(err, AppError::Conflict(_) | AppError::Forbidden(_)),
        "{err:?}"
    );

    let reported: Vec<String> = issued
        .into_iter()
        .flat_map(Result::unwrap)
        .map(|t| t.id)
        .collect();
    let stored: Vec<String> = f
        .engine
        .list_tickets(f.event_id, partnership.id)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.id)
        .collect();
    assert_eq!(stored.len(), 2);
    assert_eq!(stored, reported);
}

#[tokio::test]
async fn rejected_suggestion_keeps_the_previous_one() {
    let f = Fixture::new();
    let partnership = f.register(f.acme, f.silver, vec![]).await.unwrap();
    let first = f
        .engine
        .suggest(
            f.event_id,
            f.acme,
            partnership.id,
            SuggestPack {
                pack_id: f.gold,
                language: "fr".into(),
                option_selections: vec![OptionSelection::Text { option_id: f.stand }],
            },
        )
        .await
        .unwrap();

    // Goodies are not associated with gold.
    let err = f
        .engine
        .suggest(
            f.event_id,
            f.acme,
            partnership.id,
            SuggestPack {
                pack_id: f.gold,
                language: "fr".into(),
                option_selections: vec![OptionSelection::TypedQuantitative {
                    option_id: f.goodies,
                    selected_quantity: 3,
                }],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::ValidationError(_)), "{err:?}");

    // Goodies have no English name.
    let err = f
        .engine
        .suggest(
            f.event_id,
            f.acme,
            partnership.id,
            SuggestPack {
                pack_id: f.silver,
                language: "en".into(),
                option_selections: vec![OptionSelection::TypedQuantitative {
                    option_id: f.goodies,
                    selected_quantity: 3,
                }],
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)), "{err:?}");

    let stored = &f.partnerships().await[0];
    assert_eq!(stored.suggestion, first.suggestion);
    assert_eq!(stored.suggested_options, first.suggested_options);
    assert_eq!(stored.suggested_options.len(), 1);
    assert_eq!(stored.suggested_options[0].option_id, f.stand);
}

#[tokio::test]
async fn new_suggestion_after_approval_reverts_to_selection() {
    let f = Fixture::new();
    let partnership = f.validated(f.acme, f.silver).await;
    let suggest_gold = || SuggestPack {
        pack_id: f.gold,
        language: "fr".into(),
        option_selections: vec![],
    };

    f.engine
        .suggest(f.event_id, f.acme, partnership.id, suggest_gold())
        .await
        .unwrap();
    f.engine
        .approve_suggestion(f.event_id, f.acme, partnership.id)
        .await
        .unwrap();
    let pricing = f.engine.pricing(f.event_id, partnership.id).await.unwrap();
    assert_eq!(pricing.source, PackSource::Suggestion);
    assert_eq!(pricing.amount, Decimal::new(200000, 0));

    let resent = f
        .engine
        .suggest(f.event_id, f.acme, partnership.id, suggest_gold())
        .await
        .unwrap();
    assert!(resent.suggestion.approved_at.is_none());
    assert!(resent.suggestion.is_pending());

    let pricing = f.engine.pricing(f.event_id, partnership.id).await.unwrap();
    assert_eq!(pricing.pack_id, f.silver);
    assert_eq!(pricing.source, PackSource::Selection);
    assert_eq!(pricing.amount, Decimal::new(105000, 0));
}

#[tokio::test]
async fn billing_status_without_record_is_not_found() {
    let f = Fixture::new();
    let partnership = f.validated(f.acme, f.silver).await;

    let err = f
        .engine
        .update_billing_status(f.event_id, partnership.id, InvoiceStatus::Paid)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));

    let err = f
        .engine
        .update_billing_status(f.event_id, Uuid::new_v4(), InvoiceStatus::Paid)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}
