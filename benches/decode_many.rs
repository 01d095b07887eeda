//! This bench decodes a large batch of cause and opportunity posts, both in
//! memory and from a directory on disk.

#![allow(missing_docs)]

use chrono::{Duration, TimeZone, Utc};
use criterion::{criterion_group, criterion_main, BatchSize, Criterion};
use tempfile::TempDir;
use uuid::Uuid;
use vms::{
    client::{PostClient, PostRequest},
    CauseForm, Directory, DomainRecord, OpportunityForm, Post, Profile, Publication, Timeline,
};

const POSTS: u128 = 1_000;

fn profile() -> Profile {
    Profile {
        id: "0x01".to_string(),
        handle: "redcross.lens".to_string(),
        owned_by: "0x3A5bd000000000000000000000000000000005e3".to_string(),
    }
}

fn record(n: u128) -> DomainRecord {
    let id = Uuid::from_u128(n);
    if n % 2 == 0 {
        CauseForm {
            name: format!("Cause {n}"),
            category: "Healthcare".to_string(),
            currency: "WMATIC".to_string(),
            contribution: "5".to_string(),
            goal: "420".to_string(),
            recipient: "0x3A5bd000000000000000000000000000000005e3".to_string(),
            description: "desc".to_string(),
            country: "Canada".to_string(),
            province: "Alberta".to_string(),
            city: "Calgary".to_string(),
            image_url: String::new(),
        }
        .into_record(id, Publication::Published)
        .unwrap()
        .into()
    } else {
        OpportunityForm {
            name: format!("Opportunity {n}"),
            start_date: "2023-07-01".to_string(),
            end_date: "2023-08-31".to_string(),
            hours_per_week: "4".to_string(),
            category: "Community".to_string(),
            website: "https://example.org".to_string(),
            description: "desc".to_string(),
            image_url: String::new(),
            application_required: true,
        }
        .into_record(id, Publication::Published)
        .unwrap()
        .into()
    }
}

fn posts() -> Vec<Post> {
    let start = Utc.with_ymd_and_hms(2023, 7, 1, 0, 0, 0).unwrap();
    (0..POSTS)
        .map(|n| {
            let record = record(n);
            Post {
                id: format!("0x01-0x{n:x}"),
                profile: profile(),
                created_at: start + Duration::seconds(i64::try_from(n).unwrap()),
                is_hidden: false,
                tags: vec![record.tag().to_string()],
                attributes: record.to_attributes(),
                comment_on: None,
            }
        })
        .collect()
}

fn preseed_directory(tmp: &TempDir) {
    let root = tmp.path().to_path_buf();
    Directory::new(root.clone()).init().unwrap();
    let mut directory = Directory::new(root).load_all().unwrap();
    for n in 0..POSTS {
        let record = record(n);
        directory
            .create_post(PostRequest {
                profile: profile(),
                content: format!("#{}", record.tag()),
                name: format!("{} by redcross.lens", record.tag()),
                tags: vec![record.tag().to_string()],
                locale: "en".to_string(),
                app_id: "BCharity".to_string(),
                attributes: record.to_attributes(),
                comment_on: None,
            })
            .unwrap();
    }
}

fn decode_in_memory(c: &mut Criterion) {
    let posts = posts();
    c.bench_function("decode timeline", |b| {
        b.iter_batched(
            || posts.clone(),
            |posts| Timeline::from_posts(posts).current().len(),
            BatchSize::SmallInput,
        );
    });
}

fn load_from_disk(c: &mut Criterion) {
    let tmp = TempDir::new().unwrap();
    preseed_directory(&tmp);
    c.bench_function("load and decode directory", |b| {
        b.iter(|| {
            Directory::new(tmp.path().to_path_buf())
                .load_all()
                .unwrap()
                .timeline()
                .current()
                .len()
        });
    });
}

criterion_group!(benches, decode_in_memory, load_from_disk);
criterion_main!(benches);
