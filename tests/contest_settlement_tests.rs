mod helpers;

use helpers::contest_helpers::{
    amount_positions, apply_to_contest, create_contest, finalize_winners, percentage_positions,
    process_payouts, set_application_status, views_metrics,
};
use helpers::create_fake_login_test_user;
use spotlight_server::entities::contest::application_entity::ContestApplication;
use spotlight_server::entities::contest::contest_entity::{
    Contest, ContestPayoutStatus, ContestWinner, WinnerPayoutStatus,
};
use spotlight_server::entities::contest::payout_entity::{Payout, PayoutStatus};
use spotlight_server::entities::user_notification::UserNotification;
use spotlight_server::services::payout_service::SettlementSummary;

async fn approved_entry(
    server: &axum_test::TestServer,
    brand_token: &str,
    contest_id: &str,
    views: u64,
) -> (String, String) {
    let (creator_id, creator_token) =
        create_fake_login_test_user(server, None, Some(views_metrics(views))).await;
    let response = apply_to_contest(server, &creator_token, contest_id).await;
    response.assert_status_success();
    let application = response.json::<ContestApplication>();
    set_application_status(
        server,
        brand_token,
        &application.id.as_ref().unwrap().to_raw(),
        "Approved",
    )
    .await
    .assert_status_success();
    (creator_id, creator_token)
}

test_with_server!(
    percentage_split_settles_all_winners,
    |server, state, config| {
        let (_brand_id, brand_token) = create_fake_login_test_user(&server, None, None).await;
        let contest = create_contest(
            &server,
            &brand_token,
            100_000,
            3,
            percentage_positions(&[50, 30, 20]),
            "views",
        )
        .await;
        let contest_id = contest.id.as_ref().unwrap().to_raw();

        helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Active")
            .await
            .assert_status_success();

        // submission order: a (100), b (50), c (200)
        let (a_id, _) = {
            let (creator_id, creator_token) =
                create_fake_login_test_user(&server, Some("acct_a"), Some(views_metrics(100)))
                    .await;
            let response = apply_to_contest(&server, &creator_token, &contest_id).await;
            response.assert_status_success();
            let application = response.json::<ContestApplication>();
            set_application_status(
                &server,
                &brand_token,
                &application.id.as_ref().unwrap().to_raw(),
                "Approved",
            )
            .await
            .assert_status_success();
            (creator_id, creator_token)
        };
        let (b_id, _) = {
            let (creator_id, creator_token) =
                create_fake_login_test_user(&server, Some("acct_b"), Some(views_metrics(50))).await;
            let response = apply_to_contest(&server, &creator_token, &contest_id).await;
            response.assert_status_success();
            let application = response.json::<ContestApplication>();
            set_application_status(
                &server,
                &brand_token,
                &application.id.as_ref().unwrap().to_raw(),
                "Approved",
            )
            .await
            .assert_status_success();
            (creator_id, creator_token)
        };
        let (c_id, c_token) = {
            let (creator_id, creator_token) =
                create_fake_login_test_user(&server, Some("acct_c"), Some(views_metrics(200)))
                    .await;
            let response = apply_to_contest(&server, &creator_token, &contest_id).await;
            response.assert_status_success();
            let application = response.json::<ContestApplication>();
            set_application_status(
                &server,
                &brand_token,
                &application.id.as_ref().unwrap().to_raw(),
                "Approved",
            )
            .await
            .assert_status_success();
            (creator_id, creator_token)
        };

        helpers::contest_helpers::set_contest_status(
            &server,
            &brand_token,
            &contest_id,
            "Completed",
        )
        .await
        .assert_status_success();

        let response = finalize_winners(&server, &brand_token, &contest_id).await;
        response.assert_status_success();
        let winners = response.json::<Vec<ContestWinner>>();

        assert_eq!(winners.len(), 3);
        assert_eq!(winners[0].user.to_raw(), c_id);
        assert_eq!(winners[0].position, 1);
        assert_eq!(winners[0].prize_amount, 50_000);
        assert_eq!(winners[0].metric_value, 200.0);
        assert_eq!(winners[1].user.to_raw(), a_id);
        assert_eq!(winners[1].prize_amount, 30_000);
        assert_eq!(winners[2].user.to_raw(), b_id);
        assert_eq!(winners[2].prize_amount, 20_000);
        let allocated: i64 = winners.iter().map(|w| w.prize_amount).sum();
        assert_eq!(allocated, 100_000);

        let response = process_payouts(&server, &brand_token, &contest_id).await;
        response.assert_status_success();
        let summary = response.json::<SettlementSummary>();

        assert_eq!(summary.total_winners, 3);
        assert_eq!(summary.paid, 3);
        assert_eq!(summary.failed, 0);
        assert!(summary
            .winner_payouts
            .iter()
            .all(|r| r.status == WinnerPayoutStatus::Completed && r.transfer_id.is_some()));

        let response = server
            .get(&format!("/api/contests/{contest_id}/payout"))
            .add_header("Cookie", format!("jwt={brand_token}"))
            .add_header("Accept", "application/json")
            .await;
        response.assert_status_success();
        let payout = response.json::<Payout>();
        assert_eq!(payout.total_amount, 100_000);
        assert_eq!(payout.status, PayoutStatus::Completed);
        assert_eq!(payout.winner_payouts.len(), 3);

        let response = server
            .get(&format!("/api/contests/{contest_id}"))
            .add_header("Cookie", format!("jwt={brand_token}"))
            .add_header("Accept", "application/json")
            .await;
        response.assert_status_success();
        let contest = response.json::<Contest>();
        assert_eq!(contest.payout_status, ContestPayoutStatus::Completed);
        assert!(contest
            .winners
            .unwrap()
            .iter()
            .all(|w| w.payout_status == WinnerPayoutStatus::Completed));

        // each winner got a prize notification
        let response = server
            .get("/api/notifications")
            .add_header("Cookie", format!("jwt={c_token}"))
            .add_header("Accept", "application/json")
            .await;
        response.assert_status_success();
        let notifications = response.json::<Vec<UserNotification>>();
        assert!(notifications
            .iter()
            .any(|n| n.title.contains("prize is on the way")));

    }
);

test_with_server!(settling_twice_is_rejected, |server, state, config| {
    let (_brand_id, brand_token) = create_fake_login_test_user(&server, None, None).await;
    let contest = create_contest(
        &server,
        &brand_token,
        100_000,
        2,
        percentage_positions(&[60, 40]),
        "views",
    )
    .await;
    let contest_id = contest.id.as_ref().unwrap().to_raw();

    helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Active")
        .await
        .assert_status_success();
    let _ = approved_entry(&server, &brand_token, &contest_id, 10).await;
    helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Completed")
        .await
        .assert_status_success();

    finalize_winners(&server, &brand_token, &contest_id)
        .await
        .assert_status_success();
    process_payouts(&server, &brand_token, &contest_id)
        .await
        .assert_status_success();

    let response = process_payouts(&server, &brand_token, &contest_id).await;
    response.assert_status(reqwest::StatusCode::CONFLICT);

    // exactly one ledger record exists
    let mut res = state
        .db
        .client
        .query("(SELECT count() as count FROM ONLY contest_payout GROUP ALL).count;")
        .await
        .unwrap();
    let count: Option<i64> = res.take(0).unwrap();
    assert_eq!(count, Some(1));

    let _ = config;
});

test_with_server!(
    winner_without_destination_does_not_block_others,
    |server, state, config| {
        let (_brand_id, brand_token) = create_fake_login_test_user(&server, None, None).await;
        let contest = create_contest(
            &server,
            &brand_token,
            90_000,
            3,
            amount_positions(&[50_000, 30_000, 10_000]),
            "views",
        )
        .await;
        let contest_id = contest.id.as_ref().unwrap().to_raw();

        helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Active")
            .await
            .assert_status_success();

        // position 2 has no payout account
        let (first_id, _) = {
            let (creator_id, creator_token) =
                create_fake_login_test_user(&server, Some("acct_x"), Some(views_metrics(300)))
                    .await;
            let response = apply_to_contest(&server, &creator_token, &contest_id).await;
            response.assert_status_success();
            let application = response.json::<ContestApplication>();
            set_application_status(
                &server,
                &brand_token,
                &application.id.as_ref().unwrap().to_raw(),
                "Approved",
            )
            .await
            .assert_status_success();
            (creator_id, creator_token)
        };
        let (second_id, _) = {
            let (creator_id, creator_token) =
                create_fake_login_test_user(&server, None, Some(views_metrics(200))).await;
            let response = apply_to_contest(&server, &creator_token, &contest_id).await;
            response.assert_status_success();
            let application = response.json::<ContestApplication>();
            set_application_status(
                &server,
                &brand_token,
                &application.id.as_ref().unwrap().to_raw(),
                "Approved",
            )
            .await
            .assert_status_success();
            (creator_id, creator_token)
        };
        let (third_id, _) = {
            let (creator_id, creator_token) =
                create_fake_login_test_user(&server, Some("acct_z"), Some(views_metrics(100)))
                    .await;
            let response = apply_to_contest(&server, &creator_token, &contest_id).await;
            response.assert_status_success();
            let application = response.json::<ContestApplication>();
            set_application_status(
                &server,
                &brand_token,
                &application.id.as_ref().unwrap().to_raw(),
                "Approved",
            )
            .await
            .assert_status_success();
            (creator_id, creator_token)
        };

        helpers::contest_helpers::set_contest_status(
            &server,
            &brand_token,
            &contest_id,
            "Completed",
        )
        .await
        .assert_status_success();
        finalize_winners(&server, &brand_token, &contest_id)
            .await
            .assert_status_success();

        let response = process_payouts(&server, &brand_token, &contest_id).await;
        response.assert_status_success();
        let summary = response.json::<SettlementSummary>();

        assert_eq!(summary.total_winners, 3);
        assert_eq!(summary.paid, 2);
        assert_eq!(summary.failed, 1);

        let first = &summary.winner_payouts[0];
        assert_eq!(first.user.to_raw(), first_id);
        assert_eq!(first.status, WinnerPayoutStatus::Completed);
        let second = &summary.winner_payouts[1];
        assert_eq!(second.user.to_raw(), second_id);
        assert_eq!(second.status, WinnerPayoutStatus::Failed);
        assert_eq!(
            second.error_message.as_deref(),
            Some("No payable destination")
        );
        let third = &summary.winner_payouts[2];
        assert_eq!(third.user.to_raw(), third_id);
        assert_eq!(third.status, WinnerPayoutStatus::Completed);

    }
);

test_with_server!(
    rejected_transfer_is_isolated_per_winner,
    |server, state, config| {
        let (_brand_id, brand_token) = create_fake_login_test_user(&server, None, None).await;
        let contest = create_contest(
            &server,
            &brand_token,
            100_000,
            2,
            percentage_positions(&[70, 30]),
            "views",
        )
        .await;
        let contest_id = contest.id.as_ref().unwrap().to_raw();

        helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Active")
            .await
            .assert_status_success();

        // the mock payment rejects acct_fail* destinations
        let (_creator1, creator1_token) =
            create_fake_login_test_user(&server, Some("acct_fail_1"), Some(views_metrics(500)))
                .await;
        let response = apply_to_contest(&server, &creator1_token, &contest_id).await;
        response.assert_status_success();
        let application = response.json::<ContestApplication>();
        set_application_status(
            &server,
            &brand_token,
            &application.id.as_ref().unwrap().to_raw(),
            "Approved",
        )
        .await
        .assert_status_success();

        let (_creator2, creator2_token) =
            create_fake_login_test_user(&server, Some("acct_ok"), Some(views_metrics(100))).await;
        let response = apply_to_contest(&server, &creator2_token, &contest_id).await;
        response.assert_status_success();
        let application = response.json::<ContestApplication>();
        set_application_status(
            &server,
            &brand_token,
            &application.id.as_ref().unwrap().to_raw(),
            "Approved",
        )
        .await
        .assert_status_success();

        helpers::contest_helpers::set_contest_status(
            &server,
            &brand_token,
            &contest_id,
            "Completed",
        )
        .await
        .assert_status_success();
        finalize_winners(&server, &brand_token, &contest_id)
            .await
            .assert_status_success();

        let response = process_payouts(&server, &brand_token, &contest_id).await;
        response.assert_status_success();
        let summary = response.json::<SettlementSummary>();

        assert_eq!(summary.paid, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.winner_payouts[0].status, WinnerPayoutStatus::Failed);
        assert!(summary.winner_payouts[0]
            .error_message
            .as_deref()
            .unwrap()
            .contains("not payable"));
        assert_eq!(
            summary.winner_payouts[1].status,
            WinnerPayoutStatus::Completed
        );

        // settlement still completes once every winner was attempted
        let response = server
            .get(&format!("/api/contests/{contest_id}"))
            .add_header("Cookie", format!("jwt={brand_token}"))
            .add_header("Accept", "application/json")
            .await;
        let contest = response.json::<Contest>();
        assert_eq!(contest.payout_status, ContestPayoutStatus::Completed);

    }
);

test_with_server!(
    no_approved_entries_settles_without_payout_record,
    |server, state, config| {
        let (_brand_id, brand_token) = create_fake_login_test_user(&server, None, None).await;
        let contest = create_contest(
            &server,
            &brand_token,
            50_000,
            3,
            percentage_positions(&[50, 30, 20]),
            "views",
        )
        .await;
        let contest_id = contest.id.as_ref().unwrap().to_raw();

        helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Active")
            .await
            .assert_status_success();
        helpers::contest_helpers::set_contest_status(
            &server,
            &brand_token,
            &contest_id,
            "Completed",
        )
        .await
        .assert_status_success();

        let response = finalize_winners(&server, &brand_token, &contest_id).await;
        response.assert_status_success();
        let winners = response.json::<Vec<ContestWinner>>();
        assert!(winners.is_empty());

        let response = process_payouts(&server, &brand_token, &contest_id).await;
        response.assert_status_success();
        let summary = response.json::<SettlementSummary>();
        assert_eq!(summary.total_winners, 0);
        assert!(summary.payout.is_none());

        let response = server
            .get(&format!("/api/contests/{contest_id}/payout"))
            .add_header("Cookie", format!("jwt={brand_token}"))
            .add_header("Accept", "application/json")
            .await;
        response.assert_status(reqwest::StatusCode::NOT_FOUND);

    }
);

test_with_server!(
    fewer_entries_than_winner_slots,
    |server, state, config| {
        let (_brand_id, brand_token) = create_fake_login_test_user(&server, None, None).await;
        let contest = create_contest(
            &server,
            &brand_token,
            90_000,
            3,
            percentage_positions(&[50, 30, 20]),
            "views",
        )
        .await;
        let contest_id = contest.id.as_ref().unwrap().to_raw();

        helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Active")
            .await
            .assert_status_success();
        let _ = approved_entry(&server, &brand_token, &contest_id, 100).await;
        let _ = approved_entry(&server, &brand_token, &contest_id, 50).await;
        helpers::contest_helpers::set_contest_status(
            &server,
            &brand_token,
            &contest_id,
            "Completed",
        )
        .await
        .assert_status_success();

        let response = finalize_winners(&server, &brand_token, &contest_id).await;
        response.assert_status_success();
        let winners = response.json::<Vec<ContestWinner>>();
        assert_eq!(winners.len(), 2);
        assert_eq!(winners[0].position, 1);
        assert_eq!(winners[1].position, 2);

    }
);

test_with_server!(tie_goes_to_earlier_entry, |server, state, config| {
    let (_brand_id, brand_token) = create_fake_login_test_user(&server, None, None).await;
    let contest = create_contest(
        &server,
        &brand_token,
        100_000,
        2,
        percentage_positions(&[60, 40]),
        "views",
    )
    .await;
    let contest_id = contest.id.as_ref().unwrap().to_raw();

    helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Active")
        .await
        .assert_status_success();
    let (first_id, _) = approved_entry(&server, &brand_token, &contest_id, 100).await;
    let (second_id, _) = approved_entry(&server, &brand_token, &contest_id, 100).await;
    helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Completed")
        .await
        .assert_status_success();

    let response = finalize_winners(&server, &brand_token, &contest_id).await;
    response.assert_status_success();
    let winners = response.json::<Vec<ContestWinner>>();
    assert_eq!(winners[0].user.to_raw(), first_id);
    assert_eq!(winners[1].user.to_raw(), second_id);

});

test_with_server!(
    settlement_requires_completed_and_finalized_contest,
    |server, state, config| {
        let (_brand_id, brand_token) = create_fake_login_test_user(&server, None, None).await;
        let contest = create_contest(
            &server,
            &brand_token,
            100_000,
            1,
            percentage_positions(&[100]),
            "views",
        )
        .await;
        let contest_id = contest.id.as_ref().unwrap().to_raw();

        // still Draft: finalize and settle both refuse
        let response = finalize_winners(&server, &brand_token, &contest_id).await;
        response.assert_status(reqwest::StatusCode::CONFLICT);

        helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Active")
            .await
            .assert_status_success();
        helpers::contest_helpers::set_contest_status(
            &server,
            &brand_token,
            &contest_id,
            "Completed",
        )
        .await
        .assert_status_success();

        // completed but winners not finalized yet
        let response = process_payouts(&server, &brand_token, &contest_id).await;
        response.assert_status(reqwest::StatusCode::CONFLICT);

    }
);

test_with_server!(
    only_the_brand_can_trigger_settlement,
    |server, state, config| {
        let (_brand_id, brand_token) = create_fake_login_test_user(&server, None, None).await;
        let (_other_id, other_token) = create_fake_login_test_user(&server, None, None).await;
        let contest = create_contest(
            &server,
            &brand_token,
            100_000,
            1,
            percentage_positions(&[100]),
            "views",
        )
        .await;
        let contest_id = contest.id.as_ref().unwrap().to_raw();

        helpers::contest_helpers::set_contest_status(&server, &brand_token, &contest_id, "Active")
            .await
            .assert_status_success();
        let _ = approved_entry(&server, &brand_token, &contest_id, 10).await;
        helpers::contest_helpers::set_contest_status(
            &server,
            &brand_token,
            &contest_id,
            "Completed",
        )
        .await
        .assert_status_success();
        finalize_winners(&server, &brand_token, &contest_id)
            .await
            .assert_status_success();

        let response = process_payouts(&server, &other_token, &contest_id).await;
        response.assert_status(reqwest::StatusCode::FORBIDDEN);

    }
);
