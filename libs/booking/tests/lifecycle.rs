//! End-to-end booking flows against the in-memory store

use std::sync::Arc;

use booking::{
    BookingError, Session,
    account::{AccountService, AdminBootstrap},
    chat::ChatService,
    completion::{CompletionWatcher, MemoryAckStore},
    feed::{ChangeEvent, ChangeFeed},
    memory::{MemoryBlobStore, MemoryStore},
    models::{
        ApprovalState, Coordinates, IdentityProfile, ReservationDraft, ReservationStatus, Role,
        WorkerProfileUpdate,
    },
    reservation::ReservationService,
    store::DirectoryStore,
    upload::{PhotoUpload, PhotoUploader, UploadLimits},
    worker::WorkerService,
};
use chrono::NaiveDate;
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@beolcho.kr";

struct Harness {
    store: Arc<MemoryStore>,
    blobs: Arc<MemoryBlobStore>,
    feed: ChangeFeed,
    accounts: AccountService,
    reservations: ReservationService,
    workers: WorkerService,
    chat: ChatService,
}

impl Harness {
    fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let blobs = Arc::new(MemoryBlobStore::new());
        let feed = ChangeFeed::default();
        let uploader = PhotoUploader::new(blobs.clone(), UploadLimits::default());

        Self {
            accounts: AccountService::new(
                store.clone(),
                AdminBootstrap::new(Some(ADMIN_EMAIL.to_string())),
                feed.clone(),
            ),
            reservations: ReservationService::new(store.clone(), uploader.clone(), feed.clone()),
            workers: WorkerService::new(store.clone(), uploader, feed.clone()),
            chat: ChatService::new(store.clone(), feed.clone()),
            store,
            blobs,
            feed,
        }
    }

    async fn sign_in(&self, email: &str, name: &str) -> Session {
        let account = self
            .accounts
            .ensure_account(&IdentityProfile {
                id: Uuid::new_v4(),
                email: email.to_string(),
                display_name: name.to_string(),
            })
            .await
            .unwrap();
        Session::from_account(&account)
    }

    async fn admin(&self) -> Session {
        self.sign_in(ADMIN_EMAIL, "관리자").await
    }

    async fn refreshed(&self, session: &Session) -> Session {
        self.accounts.session_for(session.account_id).await.unwrap()
    }
}

fn draft() -> ReservationDraft {
    ReservationDraft {
        customer_name: "홍길동".to_string(),
        customer_phone: "010-1234-5678".to_string(),
        location_name: "경북 성주군 성주읍".to_string(),
        coordinates: Some(Coordinates::new(35.9191, 128.2830)),
        requested_date: NaiveDate::from_ymd_opt(2025, 9, 1),
        description: "봉분 두 기 벌초 부탁드립니다.".to_string(),
    }
}

fn photo(name: &str) -> PhotoUpload {
    PhotoUpload {
        file_name: name.to_string(),
        content_type: "image/jpeg".to_string(),
        data: vec![0xFF, 0xD8, 0xFF, 0xE0],
    }
}

#[tokio::test]
async fn test_new_reservation_is_pending_with_photos() {
    let h = Harness::new();
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;

    let reservation = assert_ok!(
        h.reservations
            .create(&customer, draft(), vec![photo("front.jpg"), photo("side.jpg")])
            .await
    );

    assert_eq!(reservation.status, ReservationStatus::Pending);
    assert_eq!(reservation.photo_urls.len(), 2);
    assert_eq!(reservation.customer_id, customer.account_id);
    assert_eq!(reservation.location_name, "경북 성주군 성주읍");
    assert!(reservation.photo_urls[0].contains(&format!("reservations/{}", customer.account_id)));
    assert_eq!(h.blobs.len(), 2);
}

#[tokio::test]
async fn test_invalid_reservation_touches_nothing() {
    let h = Harness::new();
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;

    let mut no_location = draft();
    no_location.coordinates = Some(Coordinates::new(0.0, 0.0));
    let err = assert_err!(
        h.reservations
            .create(&customer, no_location, vec![photo("a.jpg")])
            .await
    );
    assert!(matches!(err, BookingError::Validation(_)));

    let six: Vec<_> = (0..6).map(|i| photo(&format!("{}.jpg", i))).collect();
    assert_err!(h.reservations.create(&customer, draft(), six).await);

    assert!(h.blobs.is_empty());
    assert!(assert_ok!(h.reservations.list_mine(&customer).await).is_empty());
}

#[tokio::test]
async fn test_failed_upload_rolls_back_the_submission() {
    let h = Harness::new();
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    h.blobs.fail_paths_containing("broken");

    let err = assert_err!(
        h.reservations
            .create(
                &customer,
                draft(),
                vec![photo("ok.jpg"), photo("broken.jpg"), photo("ok2.jpg")]
            )
            .await
    );

    assert!(matches!(err, BookingError::Transient(_)));
    assert!(h.blobs.is_empty());
    assert!(assert_ok!(h.reservations.list_mine(&customer).await).is_empty());
}

#[tokio::test]
async fn test_failed_record_write_removes_uploaded_photos() {
    let h = Harness::new();
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    h.store.fail_writes(true);

    let err = assert_err!(
        h.reservations
            .create(&customer, draft(), vec![photo("front.jpg"), photo("side.jpg")])
            .await
    );

    assert!(matches!(err, BookingError::Transient(_)));
    assert!(h.blobs.is_empty());

    h.store.fail_writes(false);
    assert!(assert_ok!(h.reservations.list_mine(&customer).await).is_empty());
}

#[tokio::test]
async fn test_admin_moves_reservation_to_completed() {
    let h = Harness::new();
    let admin = h.admin().await;
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    let reservation = h.reservations.create(&customer, draft(), vec![]).await.unwrap();

    assert_ok!(
        h.reservations
            .set_status(&admin, reservation.id, ReservationStatus::Confirmed)
            .await
    );
    assert_ok!(
        h.reservations
            .set_status(&admin, reservation.id, ReservationStatus::Completed)
            .await
    );

    let current = assert_ok!(h.reservations.get(&customer, reservation.id).await);
    assert_eq!(current.status, ReservationStatus::Completed);

    let completed = assert_ok!(h.reservations.list_mine_completed(&customer).await);
    assert_eq!(completed.len(), 1);
}

#[tokio::test]
async fn test_non_admin_cannot_change_or_delete_reservations() {
    let h = Harness::new();
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    let reservation = h.reservations.create(&customer, draft(), vec![]).await.unwrap();

    let err = assert_err!(
        h.reservations
            .set_status(&customer, reservation.id, ReservationStatus::Completed)
            .await
    );
    assert!(matches!(err, BookingError::Authorization(_)));
    assert_err!(h.reservations.delete(&customer, reservation.id).await);
    assert_err!(h.reservations.list_all(&customer).await);

    let current = h.reservations.get(&customer, reservation.id).await.unwrap();
    assert_eq!(current.status, ReservationStatus::Pending);

    let stranger = h.sign_in("lee@beolcho.kr", "이고객").await;
    assert_err!(h.reservations.get(&stranger, reservation.id).await);
}

#[tokio::test]
async fn test_any_status_can_be_reassigned_and_deleted() {
    let h = Harness::new();
    let admin = h.admin().await;
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    let reservation = h.reservations.create(&customer, draft(), vec![]).await.unwrap();

    h.reservations
        .set_status(&admin, reservation.id, ReservationStatus::Completed)
        .await
        .unwrap();
    let reopened = assert_ok!(
        h.reservations
            .set_status(&admin, reservation.id, ReservationStatus::Pending)
            .await
    );
    assert_eq!(reopened.status, ReservationStatus::Pending);

    assert_ok!(h.reservations.delete(&admin, reservation.id).await);
    let err = assert_err!(h.reservations.delete(&admin, reservation.id).await);
    assert!(matches!(err, BookingError::NotFound(_)));
    let err = assert_err!(
        h.reservations
            .set_status(&admin, reservation.id, ReservationStatus::Confirmed)
            .await
    );
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_concurrent_status_writes_end_in_one_of_them() {
    let h = Harness::new();
    let admin_a = h.admin().await;
    let admin_b = Session::new(Uuid::new_v4(), "부관리자", Role::Admin);
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    let reservation = h.reservations.create(&customer, draft(), vec![]).await.unwrap();

    let (a, b) = tokio::join!(
        h.reservations
            .set_status(&admin_a, reservation.id, ReservationStatus::Confirmed),
        h.reservations
            .set_status(&admin_b, reservation.id, ReservationStatus::Cancelled),
    );
    assert_ok!(a);
    assert_ok!(b);

    let current = h.reservations.get(&customer, reservation.id).await.unwrap();
    assert!(matches!(
        current.status,
        ReservationStatus::Confirmed | ReservationStatus::Cancelled
    ));
}

#[tokio::test]
async fn test_application_approval_and_revocation() {
    let h = Harness::new();
    let admin = h.admin().await;
    let customer = h.sign_in("park@beolcho.kr", "박반장").await;

    let profile = assert_ok!(h.workers.apply(&customer, "박반장").await);
    assert!(!profile.is_approved);
    assert_eq!(h.refreshed(&customer).await.role, Role::Customer);
    assert!(assert_ok!(h.workers.list_public().await).is_empty());
    assert_eq!(
        h.workers.standing(&customer).await.unwrap().state,
        ApprovalState::PendingApproval
    );

    let approved = assert_ok!(h.workers.approve(&admin, customer.account_id).await);
    assert!(approved.is_approved);
    let account = h.store.get_account(customer.account_id).await.unwrap().unwrap();
    assert_eq!(account.role, Role::Worker);

    let listed = h.workers.list_public().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].account_id, customer.account_id);

    let revoked = assert_ok!(h.workers.revoke(&admin, customer.account_id).await);
    assert!(!revoked.is_approved);
    let account = h.store.get_account(customer.account_id).await.unwrap().unwrap();
    assert_eq!(account.role, Role::Customer);
    assert!(h.workers.list_public().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_only_customers_apply_and_reapplying_keeps_one_profile() {
    let h = Harness::new();
    let admin = h.admin().await;
    let customer = h.sign_in("park@beolcho.kr", "박반장").await;

    let err = assert_err!(h.workers.apply(&admin, "관리자").await);
    assert!(matches!(err, BookingError::Authorization(_)));

    h.workers.apply(&customer, "박반장").await.unwrap();
    let again = assert_ok!(h.workers.apply(&customer, "박 반장").await);
    assert_eq!(again.display_name, "박 반장");

    let roster = h.workers.roster(&admin).await.unwrap();
    assert_eq!(roster.pending.len(), 1);
    assert!(roster.approved.is_empty());
    assert_err!(h.workers.roster(&customer).await);
}

#[tokio::test]
async fn test_public_listing_ignores_availability_and_masks_phone() {
    let h = Harness::new();
    let admin = h.admin().await;
    let worker = h.sign_in("choi@beolcho.kr", "최반장").await;

    h.workers.apply(&worker, "최반장").await.unwrap();
    h.workers.approve(&admin, worker.account_id).await.unwrap();
    let worker = h.refreshed(&worker).await;

    h.workers
        .update_profile(
            &worker,
            WorkerProfileUpdate {
                phone: Some("010-9876-5432".to_string()),
                address: Some("경북 성주군".to_string()),
                is_available: Some(false),
                ..Default::default()
            },
            vec![],
        )
        .await
        .unwrap();

    let listed = h.workers.list_public().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert!(!listed[0].is_available);
    assert_eq!(listed[0].masked_phone, "010-9876-****");
}

#[tokio::test]
async fn test_profile_update_never_changes_approval() {
    let h = Harness::new();
    let admin = h.admin().await;
    let worker = h.sign_in("jung@beolcho.kr", "정반장").await;
    h.workers.apply(&worker, "정반장").await.unwrap();
    h.workers.approve(&admin, worker.account_id).await.unwrap();

    let updated = assert_ok!(
        h.workers
            .update_profile(
                &worker,
                WorkerProfileUpdate {
                    phone: Some("010-1111-2222".to_string()),
                    address: Some("대구".to_string()),
                    bio: Some("예초기 3대 보유".to_string()),
                    ..Default::default()
                },
                vec![photo("before.jpg"), photo("after.jpg")],
            )
            .await
    );
    assert!(updated.is_approved);
    assert_eq!(updated.portfolio_urls.len(), 2);

    let first = updated.portfolio_urls[0].clone();
    let trimmed = assert_ok!(h.workers.remove_portfolio_photo(&worker, &first).await);
    assert_eq!(trimmed.portfolio_urls, vec![updated.portfolio_urls[1].clone()]);
    let err = assert_err!(h.workers.remove_portfolio_photo(&worker, &first).await);
    assert!(matches!(err, BookingError::NotFound(_)));
}

#[tokio::test]
async fn test_profile_requires_phone_and_address() {
    let h = Harness::new();
    let customer = h.sign_in("han@beolcho.kr", "한반장").await;
    h.workers.apply(&customer, "한반장").await.unwrap();

    let err = assert_err!(
        h.workers
            .update_profile(
                &customer,
                WorkerProfileUpdate {
                    phone: Some("010-1111-2222".to_string()),
                    ..Default::default()
                },
                vec![photo("a.jpg")],
            )
            .await
    );
    assert!(matches!(err, BookingError::Validation(_)));
    assert!(h.blobs.is_empty());
}

#[tokio::test]
async fn test_failed_profile_save_removes_portfolio_uploads() {
    let h = Harness::new();
    let customer = h.sign_in("oh@beolcho.kr", "오반장").await;
    h.workers.apply(&customer, "오반장").await.unwrap();
    h.store.fail_writes(true);

    let err = assert_err!(
        h.workers
            .update_profile(
                &customer,
                WorkerProfileUpdate {
                    phone: Some("010-1111-2222".to_string()),
                    address: Some("대구".to_string()),
                    ..Default::default()
                },
                vec![photo("before.jpg"), photo("after.jpg")],
            )
            .await
    );

    assert!(matches!(err, BookingError::Transient(_)));
    assert!(h.blobs.is_empty());

    h.store.fail_writes(false);
    let standing = h.workers.standing(&customer).await.unwrap();
    assert!(standing.profile.unwrap().portfolio_urls.is_empty());
}

#[tokio::test]
async fn test_avatar_uploaded_before_applying_carries_over() {
    let h = Harness::new();
    let customer = h.sign_in("yoon@beolcho.kr", "윤반장").await;

    let url = assert_ok!(h.workers.set_profile_photo(&customer, photo("me.jpg")).await);
    assert_eq!(h.blobs.len(), 1);

    let account = h.store.get_account(customer.account_id).await.unwrap().unwrap();
    assert_eq!(account.photo_url.as_deref(), Some(url.as_str()));

    let profile = assert_ok!(h.workers.apply(&customer, "윤반장").await);
    assert_eq!(profile.photo_url.as_deref(), Some(url.as_str()));

    let newer = assert_ok!(h.workers.set_profile_photo(&customer, photo("me2.jpg")).await);
    let standing = h.workers.standing(&customer).await.unwrap();
    assert_eq!(standing.profile.unwrap().photo_url, Some(newer.clone()));
    let account = h.store.get_account(customer.account_id).await.unwrap().unwrap();
    assert_eq!(account.photo_url, Some(newer));
}

#[tokio::test]
async fn test_failed_avatar_write_removes_upload() {
    let h = Harness::new();
    let customer = h.sign_in("yoon@beolcho.kr", "윤반장").await;
    h.store.fail_writes(true);

    let err = assert_err!(h.workers.set_profile_photo(&customer, photo("me.jpg")).await);

    assert!(matches!(err, BookingError::Transient(_)));
    assert!(h.blobs.is_empty());
}

#[tokio::test]
async fn test_set_role_keeps_approval_in_step() {
    let h = Harness::new();
    let admin = h.admin().await;
    let applicant = h.sign_in("yoon@beolcho.kr", "윤반장").await;
    h.workers.apply(&applicant, "윤반장").await.unwrap();

    assert_ok!(h.workers.set_role(&admin, applicant.account_id, Role::Worker).await);
    let profile = h.store.get_worker(applicant.account_id).await.unwrap().unwrap();
    assert!(profile.is_approved);

    assert_ok!(h.workers.set_role(&admin, applicant.account_id, Role::Customer).await);
    let profile = h.store.get_worker(applicant.account_id).await.unwrap().unwrap();
    assert!(!profile.is_approved);

    let err = assert_err!(h.workers.set_role(&admin, admin.account_id, Role::Customer).await);
    assert!(matches!(err, BookingError::Authorization(_)));
    assert_err!(h.workers.set_role(&applicant, applicant.account_id, Role::Admin).await);
}

#[tokio::test]
async fn test_completion_notice_is_shown_until_dismissed() {
    let h = Harness::new();
    let admin = h.admin().await;
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    let mut events = h.feed.subscribe();

    let reservation = h.reservations.create(&customer, draft(), vec![]).await.unwrap();
    h.reservations
        .set_status(&admin, reservation.id, ReservationStatus::Completed)
        .await
        .unwrap();

    let acks = Arc::new(MemoryAckStore::new());
    let watcher = CompletionWatcher::new(customer.account_id, acks.clone());

    let mut prompted = None;
    while let Ok(event) = events.try_recv() {
        if event.visible_to(&customer) {
            if let Some(done) = watcher.observe_event(&event) {
                prompted = Some(done.id);
            }
        }
    }
    assert_eq!(prompted, Some(reservation.id));

    let snapshot = h.reservations.list_mine_completed(&customer).await.unwrap();
    assert!(watcher.next_prompt(&snapshot).is_some());
    watcher.dismiss(reservation.id).unwrap();
    assert!(watcher.next_prompt(&snapshot).is_none());

    // a different device starts with no flags
    let other_device = CompletionWatcher::new(customer.account_id, Arc::new(MemoryAckStore::new()));
    assert!(other_device.next_prompt(&snapshot).is_some());
}

#[tokio::test]
async fn test_bootstrap_admin_and_account_administration() {
    let h = Harness::new();
    let admin = h.admin().await;
    assert_eq!(admin.role, Role::Admin);

    let worker = h.sign_in("seo@beolcho.kr", "서반장").await;
    h.workers.apply(&worker, "서반장").await.unwrap();
    h.workers.approve(&admin, worker.account_id).await.unwrap();

    let edited = assert_ok!(
        h.accounts
            .update_details(&admin, worker.account_id, "서 반장", "seo2@beolcho.kr")
            .await
    );
    assert_eq!(edited.email, "seo2@beolcho.kr");
    let profile = h.store.get_worker(worker.account_id).await.unwrap().unwrap();
    assert_eq!(profile.display_name, "서 반장");

    assert_err!(h.accounts.delete(&admin, admin.account_id).await);
    assert_ok!(h.accounts.delete(&admin, worker.account_id).await);
    assert!(h.store.get_worker(worker.account_id).await.unwrap().is_none());
    assert!(h.store.get_account(worker.account_id).await.unwrap().is_none());

    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    let renamed = assert_ok!(h.accounts.rename_self(&customer, "김철수").await);
    assert_eq!(renamed.display_name, "김철수");
    assert_err!(h.accounts.list(&customer).await);
    assert_eq!(h.accounts.list(&admin).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_seed_admin_promotes_existing_account() {
    let store = Arc::new(MemoryStore::new());
    let feed = ChangeFeed::default();
    let plain = AccountService::new(store.clone(), AdminBootstrap::default(), feed.clone());

    let account = plain
        .ensure_account(&IdentityProfile {
            id: Uuid::new_v4(),
            email: "Owner@Beolcho.kr".to_string(),
            display_name: "대표".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(account.role, Role::Customer);
    assert!(plain.seed_admin().await.unwrap().is_none());

    let seeded = AccountService::new(
        store.clone(),
        AdminBootstrap::new(Some("owner@beolcho.kr".to_string())),
        feed,
    );
    let promoted = seeded.seed_admin().await.unwrap().unwrap();
    assert_eq!(promoted.id, account.id);
    assert_eq!(promoted.role, Role::Admin);
}

#[tokio::test]
async fn test_chat_rooms_are_private_to_owner_and_admin() {
    let h = Harness::new();
    let admin = h.admin().await;
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    let stranger = h.sign_in("lee@beolcho.kr", "이고객").await;
    let room = customer.account_id;

    assert_ok!(h.chat.send(&customer, room, "예약 문의드립니다").await);
    assert_ok!(h.chat.send(&admin, room, "네, 말씀하세요").await);
    assert_err!(h.chat.send(&customer, room, "   ").await);
    assert_err!(h.chat.send(&stranger, room, "끼어들기").await);
    assert_err!(h.chat.messages(&stranger, room).await);

    let messages = h.chat.messages(&customer, room).await.unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text, "예약 문의드립니다");

    let rooms = h.chat.rooms(&admin).await.unwrap();
    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].customer_name, "김고객");
    assert_eq!(rooms[0].last_message, "네, 말씀하세요");
    assert_err!(h.chat.rooms(&customer).await);

    assert_eq!(h.chat.delete_room(&customer, room).await.unwrap(), 2);
    assert!(h.chat.rooms(&admin).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_feed_delivers_reservation_events() {
    let h = Harness::new();
    let customer = h.sign_in("kim@beolcho.kr", "김고객").await;
    let mut events = h.feed.subscribe();

    let reservation = h.reservations.create(&customer, draft(), vec![]).await.unwrap();

    let event = events.recv().await.unwrap();
    assert_eq!(event, ChangeEvent::ReservationCreated { reservation });
}

#[tokio::test]
async fn test_feed_masks_worker_phone_for_other_customers() {
    let h = Harness::new();
    let admin = h.admin().await;
    let worker = h.sign_in("seo@beolcho.kr", "서반장").await;
    let stranger = h.sign_in("kim@beolcho.kr", "김고객").await;

    h.workers.apply(&worker, "서반장").await.unwrap();
    h.workers
        .update_profile(
            &worker,
            WorkerProfileUpdate {
                phone: Some("010-9876-5432".to_string()),
                address: Some("경북 성주군".to_string()),
                ..Default::default()
            },
            vec![],
        )
        .await
        .unwrap();

    let mut events = h.feed.subscribe();
    h.workers.approve(&admin, worker.account_id).await.unwrap();

    let mut public_views = 0;
    while let Ok(event) = events.try_recv() {
        let Some(view) = event.view_for(&stranger) else {
            continue;
        };
        let payload = serde_json::to_string(&view).unwrap();
        assert!(!payload.contains("010-9876-5432"));
        if matches!(view, ChangeEvent::PublicWorkerChanged { .. }) {
            public_views += 1;
        }
    }
    assert_eq!(public_views, 1);
}
