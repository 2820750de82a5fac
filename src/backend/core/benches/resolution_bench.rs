//! Permission resolution benchmarks. Run with: cargo bench --bench resolution_bench
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::time::Duration;
use warden_core::rbac::{AuthStore, NewPermission, NewRole, NewUser, PermissionId, UserId, SUPERADMIN_ID};
use warden_core::validation::Validate;

/// Seeded store plus `n` extra permissions, all granted to one wide role held by one user.
fn enlarged_store(n: usize) -> (AuthStore, UserId) {
    let mut store = AuthStore::seeded();
    let ids: Vec<PermissionId> = (0..n).map(|i| store.add_permission(NewPermission::new(format!("custom_{}", i), format!("Custom permission {}", i), "users", "view"))).collect();
    let role = store.add_role(NewRole::new("Wide", "Holds every custom permission").with_permissions(ids));
    let user = store.add_user(NewUser::new("wide@example.com", "Wide User", role));
    (store, user)
}

fn bench_seeded(c: &mut Criterion) {
    let mut g = c.benchmark_group("resolution_seeded"); g.measurement_time(Duration::from_secs(5));
    let mut store = AuthStore::seeded();
    let superadmin = UserId::new(SUPERADMIN_ID);
    let viewer = store.add_user(NewUser::new("viewer@example.com", "Viewer", "user"));
    let ghost = UserId::new("ghost");
    g.bench_function("superadmin_granted", |b| b.iter(|| black_box(store.has_permission(black_box(&superadmin), "manage_permissions"))));
    g.bench_function("viewer_denied", |b| b.iter(|| black_box(store.has_permission(black_box(&viewer), "delete_users"))));
    g.bench_function("unknown_user", |b| b.iter(|| black_box(store.has_permission(black_box(&ghost), "view_users"))));
    g.bench_function("user_permissions_superadmin", |b| b.iter(|| black_box(store.user_permissions(black_box(&superadmin)))));
    g.bench_function("check_all_three", |b| b.iter(|| black_box(store.check_all(&viewer, &["view_users", "view_roles", "view_teams"]))));
    g.finish();
}

fn bench_enlarged(c: &mut Criterion) {
    let mut g = c.benchmark_group("resolution_enlarged"); g.measurement_time(Duration::from_secs(8));
    for &n in &[100usize, 1_000, 10_000] {
        let (store, user) = enlarged_store(n);
        g.throughput(Throughput::Elements(n as u64));
        g.bench_with_input(BenchmarkId::new("has_permission_last", n), &n, |b, &n| { let name = format!("custom_{}", n - 1); b.iter(|| black_box(store.has_permission(&user, &name))) });
        g.bench_with_input(BenchmarkId::new("has_permission_missing", n), &n, |b, _| b.iter(|| black_box(store.has_permission(&user, "no_such_permission"))));
        g.bench_with_input(BenchmarkId::new("user_permissions", n), &n, |b, _| b.iter(|| black_box(store.user_permissions(&user).len())));
    }
    g.finish();
}

fn bench_validation(c: &mut Criterion) {
    let mut g = c.benchmark_group("validation_inputs");
    let valid = NewUser::new("user@example.com", "Valid User", "user");
    let invalid = NewUser::new("not-an-email", "", "");
    g.bench_function("new_user_valid", |b| b.iter(|| black_box(valid.validate())));
    g.bench_function("new_user_invalid", |b| b.iter(|| black_box(invalid.validate())));
    g.finish();
}

criterion_group!(benches, bench_seeded, bench_enlarged, bench_validation);
criterion_main!(benches);
