// SPDX-FileCopyrightText: Copyright (c) 2025 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
// SPDX-License-Identifier: Apache-2.0
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
// http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fetching: single resources, paged collections, tolerant multi-get,
//! links and error normalization.

use fishbind::computer_system::ComputerSystem;
use fishbind::drive::Drive;
use fishbind::drive::DriveExt;
use fishbind::volume::VolumeExt;
use fishbind::ErrorKind;
use fishbind::Link;
use fishbind::ODataId;
use fishbind::Resource;
use fishbind::ResourceProvidesStatus;
use fishbind_tests::client;
use fishbind_tests::fixtures::collection;
use fishbind_tests::fixtures::computer_system;
use fishbind_tests::fixtures::drive;
use fishbind_tests::fixtures::volume;
use fishbind_tests::fixtures::DRIVE;
use fishbind_tests::fixtures::SYSTEM;
use fishbind_tests::fixtures::SYSTEMS;
use fishbind_tests::json_merge;
use fishbind_tests::Error;
use fishbind_tests::Expect;
use fishbind_tests::ODATA_ID;
use http::Method;
use http::StatusCode;
use serde_json::json;
use tokio::test;

fn member(n: usize) -> String {
    format!("{SYSTEMS}/{n}")
}

// Typed get decodes identity and status.
#[test]
async fn get_resource() -> Result<(), Error> {
    let (_, client) = client([Expect::get(
        SYSTEM,
        computer_system(SYSTEM, &json!({"PowerState": "On", "Description": null})),
    )]);
    let system = client.get::<ComputerSystem>(&ODataId::from(SYSTEM)).await?;
    assert_eq!(system.odata_id().as_str(), SYSTEM);
    assert_eq!(system.id().map(|id| id.inner().as_str()), Some("1"));
    assert!(system.description().is_none());
    assert!(system.is_healthy());
    Ok(())
}

// Pages are followed through `Members@odata.nextLink` and flattened in
// source order.
#[test]
async fn collection_pages_are_flattened() -> Result<(), Error> {
    let a = member(1);
    let b = member(2);
    let c = member(3);
    let second = format!("{SYSTEMS}?$skip=2");
    let (bmc, client) = client([
        Expect::get(
            SYSTEMS,
            json_merge([
                &collection(SYSTEMS, &[&a, &b], Some(&second)),
                &json!({"Members@odata.count": 3}),
            ]),
        ),
        Expect::get(
            &second,
            json_merge([
                &collection(SYSTEMS, &[&c], None),
                &json!({"Members@odata.count": 3}),
            ]),
        ),
        Expect::get(&a, computer_system(&a, &json!({}))),
        Expect::get(&b, computer_system(&b, &json!({}))),
        Expect::get(&c, computer_system(&c, &json!({}))),
    ]);
    let systems = client
        .get_collection::<ComputerSystem>(&ODataId::from(SYSTEMS))
        .await?;
    let ids = systems
        .iter()
        .map(|s| s.odata_id().to_string())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![a, b, c]);
    assert_eq!(bmc.remaining(), 0);
    Ok(())
}

// Member count is the sum of page sizes regardless of page layout,
// empty pages included.
#[test]
async fn collection_member_count_is_sum_of_pages() -> Result<(), Error> {
    let sizes = [3_usize, 0, 2, 1];
    let mut expectations = Vec::new();
    let mut expected = Vec::new();
    let mut next = 0;
    for (page, size) in sizes.iter().enumerate() {
        let uri = if page == 0 {
            SYSTEMS.to_string()
        } else {
            format!("{SYSTEMS}?page={page}")
        };
        let members = (next..next + size).map(member).collect::<Vec<_>>();
        next += size;
        expected.extend(members.iter().cloned());
        let next_link = if page + 1 < sizes.len() {
            Some(format!("{SYSTEMS}?page={}", page + 1))
        } else {
            None
        };
        let refs = members.iter().map(String::as_str).collect::<Vec<_>>();
        expectations.push(Expect::get(
            &uri,
            collection(SYSTEMS, &refs, next_link.as_deref()),
        ));
    }
    let (_, client) = client(expectations);
    let members = client.collection_members(&ODataId::from(SYSTEMS)).await?;
    assert_eq!(members.len(), 6);
    assert_eq!(members.uris().collect::<Vec<_>>(), expected);
    Ok(())
}

// A `nextLink` revisiting a page is an error, not an endless loop.
#[test]
async fn pagination_loop_is_detected() -> Result<(), Error> {
    let second = format!("{SYSTEMS}?$skip=1");
    let (_, client) = client([
        Expect::get(SYSTEMS, collection(SYSTEMS, &[&member(1)], Some(&second))),
        Expect::get(&second, collection(SYSTEMS, &[&member(2)], Some(SYSTEMS))),
    ]);
    let err = client
        .collection_members(&ODataId::from(SYSTEMS))
        .await
        .err()
        .ok_or(Error::ExpectedProperty("pagination loop"))?;
    assert!(matches!(err, fishbind::Error::PaginationLoop(_)));
    assert_eq!(err.kind(), ErrorKind::ServiceError);
    Ok(())
}

// One failing member does not fail the others; order is kept.
#[test]
async fn get_many_tolerates_failures() -> Result<(), Error> {
    let ids = (1..=4).map(member).collect::<Vec<_>>();
    let (bmc, client) = client([
        Expect::get(&ids[0], computer_system(&ids[0], &json!({}))),
        Expect::get(&ids[1], json!({})).with_status(StatusCode::NOT_FOUND),
        Expect::get(&ids[2], computer_system(&ids[2], &json!({}))),
        Expect::get(&ids[3], computer_system(&ids[3], &json!({}))),
    ]);
    let odata_ids = ids.iter().map(|id| ODataId::from(id.as_str())).collect::<Vec<_>>();
    let many = client.get_many::<ComputerSystem>(&odata_ids).await;
    assert!(!many.is_complete());
    assert_eq!(
        many.successes
            .iter()
            .map(|s| s.odata_id().to_string())
            .collect::<Vec<_>>(),
        vec![ids[0].clone(), ids[2].clone(), ids[3].clone()]
    );
    assert_eq!(many.failures.len(), 1);
    assert_eq!(many.failures[0].0.as_str(), ids[1]);
    assert_eq!(many.failures[0].1.kind(), ErrorKind::NotFound);
    assert_eq!(bmc.requests_with(&Method::GET).len(), 4);
    Ok(())
}

// Non-2xx responses carry the parsed error envelope.
#[test]
async fn service_error_envelope() -> Result<(), Error> {
    let (_, client) = client([Expect::get(
        SYSTEM,
        json!({
            "error": {
                "code": "Base.1.0.GeneralError",
                "message": "nope",
                "@Message.ExtendedInfo": [{
                    "MessageId": "X",
                    "Severity": "Critical",
                    "Resolution": "retry"
                }]
            }
        }),
    )
    .with_status(StatusCode::BAD_REQUEST)]);
    let err = client
        .get::<ComputerSystem>(&ODataId::from(SYSTEM))
        .await
        .err()
        .ok_or(Error::ExpectedProperty("service error"))?;
    assert_eq!(err.kind(), ErrorKind::ServiceError);
    assert_eq!(err.status(), Some(StatusCode::BAD_REQUEST));
    let envelope = err
        .redfish_error()
        .ok_or(Error::ExpectedProperty("envelope"))?;
    assert_eq!(envelope.code, "Base.1.0.GeneralError");
    assert_eq!(envelope.message, "nope");
    assert_eq!(envelope.extended_info[0].message_id, "X");
    assert_eq!(envelope.extended_info[0].severity.as_deref(), Some("Critical"));
    assert_eq!(envelope.extended_info[0].resolution.as_deref(), Some("retry"));
    Ok(())
}

// Status codes map to error kinds; bodies that are not envelopes are
// kept raw.
#[test]
async fn status_codes_map_to_kinds() -> Result<(), Error> {
    let cases = [
        (StatusCode::UNAUTHORIZED, ErrorKind::Authentication),
        (StatusCode::FORBIDDEN, ErrorKind::Authorization),
        (StatusCode::NOT_FOUND, ErrorKind::NotFound),
        (StatusCode::CONFLICT, ErrorKind::Conflict),
        (StatusCode::TOO_MANY_REQUESTS, ErrorKind::RateLimited),
        (StatusCode::INTERNAL_SERVER_ERROR, ErrorKind::ServiceError),
    ];
    for (status, kind) in cases.iter() {
        let (_, client) = client([Expect::get_raw(SYSTEM, "<html>oops</html>").with_status(*status)]);
        let err = client
            .get::<ComputerSystem>(&ODataId::from(SYSTEM))
            .await
            .err()
            .ok_or(Error::ExpectedProperty("error"))?;
        assert_eq!(err.kind(), *kind, "status {status}");
        assert!(err.redfish_error().is_none());
        assert_eq!(
            err.service_error().map(|e| e.body.clone()),
            Some(b"<html>oops</html>".to_vec())
        );
    }
    Ok(())
}

// Throttling keeps the service's Retry-After hint.
#[test]
async fn rate_limit_hint() -> Result<(), Error> {
    let (_, client) = client([Expect::get_raw(SYSTEM, "")
        .with_status(StatusCode::TOO_MANY_REQUESTS)
        .with_header("Retry-After", "2")]);
    let err = client
        .get::<ComputerSystem>(&ODataId::from(SYSTEM))
        .await
        .err()
        .ok_or(Error::ExpectedProperty("rate limited"))?;
    assert_eq!(err.kind(), ErrorKind::RateLimited);
    assert_eq!(
        err.service_error().and_then(|e| e.retry_after()),
        Some(std::time::Duration::from_secs(2))
    );
    Ok(())
}

// Undecodable documents are encoding errors.
#[test]
async fn undecodable_body() -> Result<(), Error> {
    let (_, client) = client([
        Expect::get_raw(SYSTEM, "not json"),
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({"PowerState": 3}))),
    ]);
    for _ in 0..2 {
        let err = client
            .get::<ComputerSystem>(&ODataId::from(SYSTEM))
            .await
            .err()
            .ok_or(Error::ExpectedProperty("decode error"))?;
        assert_eq!(err.kind(), ErrorKind::Encoding);
    }
    Ok(())
}

// Links survive a serialize/parse cycle; an absent link is empty.
#[test]
async fn link_round_trip() -> Result<(), Error> {
    let link: Link = serde_json::from_value(json!({ ODATA_ID: "/redfish/v1/Chassis/1" }))
        .map_err(|e| Error::Unexpected(e.to_string()))?;
    let again: Link = serde_json::to_value(&link)
        .and_then(serde_json::from_value)
        .map_err(|e| Error::Unexpected(e.to_string()))?;
    assert_eq!(again.uri(), "/redfish/v1/Chassis/1");
    assert_eq!(link, again);

    let (_, client) = client([Expect::get(
        DRIVE,
        json_merge([&drive(), &json!({"Assembly": null})]),
    )]);
    let drive = client.get::<Drive>(&ODataId::from(DRIVE)).await?;
    assert!(drive.assembly.is_empty());
    assert_eq!(drive.assembly.uri(), "");
    assert!(drive.assembly().await?.is_none());
    Ok(())
}

// Links are resolved on request, in both directions, without
// walking cycles.
#[test]
async fn follow_links() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(DRIVE, drive()),
        Expect::get("/redfish/v1/Volumes/Volume-1", volume()),
        Expect::get(DRIVE, drive()),
    ]);
    let drive = client.get::<Drive>(&ODataId::from(DRIVE)).await?;
    let links = drive.links.as_ref().ok_or(Error::ExpectedProperty("Links"))?;
    assert!(links.volumes.count_matches(links.volumes_count));
    assert!(links.endpoints.count_matches(links.endpoints_count));
    assert!(!links.volumes.count_matches(Some(5)));

    let volumes = drive.volumes().await;
    assert!(volumes.is_complete());
    assert_eq!(volumes.successes.len(), 1);
    let volume = &volumes.successes[0];
    assert_eq!(volume.display_name, Some(None));
    assert_eq!(bmc.requests().len(), 2);

    let drives = volume.drives().await;
    assert_eq!(drives.successes[0].odata_id().as_str(), DRIVE);
    assert_eq!(bmc.requests().len(), 3);
    Ok(())
}
