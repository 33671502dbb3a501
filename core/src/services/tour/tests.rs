//! Unit tests for the walkthrough service

use std::sync::Arc;

use crate::domain::entities::doctor::TransactionOutcome;
use crate::repositories::{DoctorRepository, MockDoctorRepository};
use crate::services::tour::{TourPlan, TourService};

#[tokio::test]
async fn test_default_tour_on_empty_repository() {
    let repo = Arc::new(MockDoctorRepository::new());
    let service = TourService::new(repo.clone());

    let report = service.run().await.unwrap();

    assert_eq!(report.updated_age, 20);
    // Dr.Lin (20) and Dr.Wu (20) are both older than 18
    assert_eq!(report.older_count, 2);
    assert_eq!(report.deleted_rows, 1);
    assert_eq!(report.transaction, TransactionOutcome::Committed { first: 1, second: 1 });

    // Dr.Lin was deleted, Dr.Wu, Dr.Huang and Dr.Chen remain
    assert_eq!(repo.len().await, 3);
    assert!(repo.find_by_id(report.primary_id).await.unwrap().is_none());
    assert_eq!(repo.find_by_name("Dr.Huang").await[0].age, 41);
    assert_eq!(repo.find_by_name("Dr.Chen").await[0].age, 21);
}

#[tokio::test]
async fn test_repeated_tours_accumulate_rows() {
    let repo = Arc::new(MockDoctorRepository::new());
    let service = TourService::new(repo.clone());

    service.run().await.unwrap();
    let report = service.run().await.unwrap();

    // Both Dr.Huang rows and both Dr.Chen rows are updated
    assert_eq!(report.transaction, TransactionOutcome::Committed { first: 2, second: 2 });
    assert_eq!(repo.len().await, 6);
}

#[tokio::test]
async fn test_custom_plan() {
    let repo = Arc::new(MockDoctorRepository::new());
    let plan = TourPlan {
        older_than: 30,
        ..TourPlan::default()
    };
    let service = TourService::with_plan(repo, plan);

    let report = service.run().await.unwrap();

    // Dr.Lin was updated to 20 and Dr.Wu is 20, neither is older than 30
    assert_eq!(report.older_count, 0);
    assert_eq!(service.plan().older_than, 30);
}
