use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use tokio::runtime::Runtime;

use roost_accounts::{NewUser, User};
use roost_core::{CityId, UserId};
use roost_geo::{City, NewCity};
use roost_listings::{Amenity, NewAmenity, NewPlace, Place, PlaceAmenity};
use roost_store::{Datastore, MemoryStore};

fn test_user(n: usize) -> User {
    User::create(NewUser {
        email: format!("user{n}@bench.io"),
        username: format!("user{n}"),
        first_name: "Bench".to_string(),
        last_name: "User".to_string(),
        password: "bench-password".to_string(),
        is_admin: None,
    })
    .unwrap()
}

fn test_place(host_id: UserId, city_id: CityId, n: usize) -> Place {
    Place::create(NewPlace {
        name: format!("Place {n}"),
        description: Some("Benchmark listing".to_string()),
        address: None,
        latitude: Some(45.0),
        longitude: Some(4.8),
        host_id,
        city_id,
        price_per_night: Some(100),
        number_of_rooms: Some(2),
        number_of_bathrooms: Some(1),
        max_guests: Some(4),
    })
    .unwrap()
}

fn bench_user_insert(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let mut group = c.benchmark_group("user_insert");

    for size in [10_usize, 100, 1_000] {
        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::from_parameter(size), &size, |b, &size| {
            b.iter(|| {
                rt.block_on(async {
                    let store = MemoryStore::new();
                    for n in 0..size {
                        store.user_insert(test_user(n)).await.unwrap();
                    }
                    black_box(store.user_all().await.unwrap().len())
                })
            });
        });
    }
    group.finish();
}

fn bench_user_lookup(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = MemoryStore::new();
    let mut ids = Vec::new();
    rt.block_on(async {
        for n in 0..1_000 {
            let user = test_user(n);
            ids.push(user.id);
            store.user_insert(user).await.unwrap();
        }
    });

    c.bench_function("user_get/1000", |b| {
        let mut cursor = 0;
        b.iter(|| {
            cursor = (cursor + 97) % ids.len();
            rt.block_on(async { black_box(store.user_get(ids[cursor]).await.unwrap()) })
        });
    });
}

fn bench_amenity_join(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let store = MemoryStore::new();

    let place_id = rt.block_on(async {
        let host = test_user(0);
        let host_id = host.id;
        store.user_insert(host).await.unwrap();

        let city = City::create(NewCity {
            name: "Benchville".to_string(),
            country_code: "FR".parse().unwrap(),
        })
        .unwrap();
        let city_id = city.id;
        store.city_insert(city).await.unwrap();

        let place = test_place(host_id, city_id, 0);
        let place_id = place.id;
        store.place_insert(place).await.unwrap();

        for n in 0..50 {
            let amenity = Amenity::create(NewAmenity {
                name: format!("Amenity {n}"),
            })
            .unwrap();
            let amenity_id = amenity.id;
            store.amenity_insert(amenity).await.unwrap();
            store
                .link_insert(PlaceAmenity::link(place_id, amenity_id))
                .await
                .unwrap();
        }
        place_id
    });

    c.bench_function("amenities_for_place/50", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(store.amenities_for_place(place_id).await.unwrap().len())
            })
        });
    });
}

criterion_group!(
    benches,
    bench_user_insert,
    bench_user_lookup,
    bench_amenity_join
);
criterion_main!(benches);
