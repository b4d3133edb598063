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

//! Update (PATCH diff) behaviour.

use fishbind::assembly::Assembly;
use fishbind::computer_system::ComputerSystem;
use fishbind::drive::Drive;
use fishbind::drive::StatusIndicator;
use fishbind::resource::IndicatorLed;
use fishbind::ErrorKind;
use fishbind::ODataETag;
use fishbind::ODataId;
use fishbind::UpdateOptions;
use fishbind::UpdateOutcome;
use fishbind_tests::client;
use fishbind_tests::fixtures::computer_system;
use fishbind_tests::fixtures::drive;
use fishbind_tests::fixtures::DRIVE;
use fishbind_tests::fixtures::SYSTEM;
use fishbind_tests::json_merge;
use fishbind_tests::Error;
use fishbind_tests::Expect;
use fishbind_tests::ODATA_ETAG;
use http::header::IF_MATCH;
use http::Method;
use http::StatusCode;
use serde_json::json;
use tokio::test;

fn system_id() -> ODataId {
    ODataId::from(SYSTEM)
}

// Fetch followed by update without local change must not reach the
// service.
#[test]
async fn unchanged_system_sends_nothing() -> Result<(), Error> {
    let body = computer_system(
        SYSTEM,
        &json!({
            "AssetTag": "old",
            "HostName": null,
            "PowerOnDelaySeconds": 5.0,
            "Boot": {
                "BootSourceOverrideEnabled": "Disabled",
                "BootSourceOverrideTarget@Redfish.AllowableValues": ["None", "Pxe"],
                "UefiTargetBootSourceOverride": null
            }
        }),
    );
    let (bmc, client) = client([Expect::get(SYSTEM, &body)]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    assert_eq!(system.patch_payload()?, None);
    assert_eq!(system.update().await?, UpdateOutcome::Unchanged);
    assert!(bmc.requests_with(&Method::PATCH).is_empty());
    Ok(())
}

// Service `null`s inside a writable object survive the round trip.
#[test]
async fn unchanged_boot_with_nulls_sends_nothing() -> Result<(), Error> {
    let body = computer_system(
        SYSTEM,
        &json!({
            "Boot": {
                "BootSourceOverrideEnabled": "Disabled",
                "BootSourceOverrideTarget": "None",
                "BootSourceOverrideMode": null,
                "BootOrder": null
            }
        }),
    );
    let (bmc, client) = client([Expect::get(SYSTEM, &body)]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    let boot = system.boot.as_ref().ok_or(Error::ExpectedProperty("Boot"))?;
    assert_eq!(boot.boot_source_override_mode, Some(None));
    assert_eq!(boot.boot_order, Some(None));
    assert_eq!(system.patch_payload()?, None);
    assert!(system.update().await?.is_unchanged());
    assert!(bmc.requests_with(&Method::PATCH).is_empty());
    Ok(())
}

// Same for assembly entries with null identity members.
#[test]
async fn unchanged_assembly_with_nulls_sends_nothing() -> Result<(), Error> {
    const ASSEMBLY: &str = "/redfish/v1/Chassis/1/Assembly";
    let body = json!({
        "@odata.id": ASSEMBLY,
        "@odata.type": "#Assembly.v1_5_0.Assembly",
        "Id": "Assembly",
        "Name": "Chassis Assembly",
        "Assemblies": [
            {
                "@odata.id": null,
                "MemberId": null,
                "Model": "Carrier",
                "SerialNumber": null
            }
        ]
    });
    let (bmc, client) = client([Expect::get(ASSEMBLY, &body)]);
    let mut assembly = client.get::<Assembly>(&ODataId::from(ASSEMBLY)).await?;
    assert!(assembly.update().await?.is_unchanged());
    assert!(bmc.requests_with(&Method::PATCH).is_empty());
    Ok(())
}

// Same for a document with many read-only and unmodelled properties.
#[test]
async fn unchanged_drive_sends_nothing() -> Result<(), Error> {
    let (bmc, client) = client([Expect::get(DRIVE, drive())]);
    let mut drive = client.get::<Drive>(&ODataId::from(DRIVE)).await?;
    assert!(drive.update().await?.is_unchanged());
    assert!(bmc.requests_with(&Method::PATCH).is_empty());
    Ok(())
}

// Changing one writable property sends exactly that property.
#[test]
async fn single_change_is_minimal() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({"AssetTag": "old", "HostName": "web01"}))),
        Expect::patch(SYSTEM, json!({"AssetTag": "new"}), ""),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    system.asset_tag = Some(Some("new".into()));
    let outcome = system.update().await?;
    assert_eq!(
        outcome,
        UpdateOutcome::Applied {
            extended_info: vec![]
        }
    );

    let patches = bmc.requests_with(&Method::PATCH);
    assert_eq!(patches.len(), 1);
    assert_eq!(patches[0].uri, SYSTEM);
    assert_eq!(patches[0].body, Some(json!({"AssetTag": "new"})));

    // The accepted change becomes the new baseline.
    assert!(system.update().await?.is_unchanged());
    assert_eq!(bmc.requests_with(&Method::PATCH).len(), 1);
    Ok(())
}

// Read-only properties never reach the service, whatever their local
// value.
#[test]
async fn read_only_changes_are_not_sent() -> Result<(), Error> {
    let (bmc, client) = client([Expect::get(
        SYSTEM,
        computer_system(SYSTEM, &json!({"Manufacturer": "Contoso", "PowerState": "On"})),
    )]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    system.manufacturer = Some("Fabrikam".into());
    system.serial_number = Some("SN-1".into());
    system.base.name = Some("renamed".into());
    assert!(system.update().await?.is_unchanged());
    assert!(bmc.requests().iter().all(|r| r.method == Method::GET));
    Ok(())
}

// Mixed writable and read-only changes on the sample drive.
#[test]
async fn drive_update_skips_status_indicator() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(DRIVE, drive()),
        Expect::patch(
            DRIVE,
            json!({
                "AssetTag": "TestAssetTag",
                "IndicatorLED": "Lit",
                "WriteCacheEnabled": false
            }),
            "",
        ),
    ]);
    let mut drive = client.get::<Drive>(&ODataId::from(DRIVE)).await?;
    drive.asset_tag = Some(Some("TestAssetTag".into()));
    drive.indicator_led = Some(IndicatorLed::Lit);
    drive.status_indicator = Some(StatusIndicator::Hotspare);
    drive.write_cache_enabled = Some(false);
    drive.update().await?;

    let patches = bmc.requests_with(&Method::PATCH);
    assert_eq!(patches.len(), 1);
    let body = patches[0].body.as_ref().ok_or(Error::ExpectedProperty("body"))?;
    assert!(body.get("StatusIndicator").is_none());
    assert_eq!(body["WriteCacheEnabled"], json!(false));
    Ok(())
}

// Opaque OEM content survives fetch and no-op update unchanged, and is
// not sent along with unrelated changes.
#[test]
async fn oem_is_preserved() -> Result<(), Error> {
    let served = computer_system(
        SYSTEM,
        &json!({
            "AssetTag": "old",
            "Oem": {
                "Contoso": {
                    "Rack": {"Slot": 7, "Weights": [1.5, 2.0]},
                    "Flags": null,
                    "Nested": [{"A": {"B": []}}]
                }
            }
        }),
    );
    let (bmc, client) = client([
        Expect::get(SYSTEM, &served),
        Expect::patch(SYSTEM, json!({"AssetTag": "new"}), ""),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    assert_eq!(system.raw(), served.to_string().as_bytes());
    assert!(system.update().await?.is_unchanged());

    system.asset_tag = Some(Some("new".into()));
    system.update().await?;
    let patches = bmc.requests_with(&Method::PATCH);
    assert_eq!(patches[0].body, Some(json!({"AssetTag": "new"})));
    assert_eq!(system.oem.as_ref(), served.get("Oem"));
    Ok(())
}

// Nullable writable properties distinguish "leave alone" from "clear".
#[test]
async fn nullable_property_is_cleared() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({"HostName": "web01"}))),
        Expect::patch(SYSTEM, json!({"HostName": null}), ""),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    assert_eq!(system.host_name, Some(Some("web01".into())));
    system.host_name = Some(None);
    system.update().await?;
    assert_eq!(
        bmc.requests_with(&Method::PATCH)[0].body,
        Some(json!({"HostName": null}))
    );
    Ok(())
}

// A writable property the service did not return is sent once set.
#[test]
async fn property_absent_from_service_is_sent() -> Result<(), Error> {
    let (_, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({}))),
        Expect::patch(SYSTEM, json!({"LocationIndicatorActive": true}), ""),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    system.location_indicator_active = Some(true);
    system.update().await?;
    Ok(())
}

// A tag known for the entity is sent as `If-Match`; a stale tag is
// reported as a conflict.
#[test]
async fn etag_is_matched() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(
            SYSTEM,
            computer_system(SYSTEM, &json!({ ODATA_ETAG: "W/\"1\"", "AssetTag": "a" })),
        ),
        Expect::patch(SYSTEM, json!({"AssetTag": "b"}), "").with_header("ETag", "W/\"2\""),
        Expect::patch(SYSTEM, json!({"AssetTag": "c"}), "")
            .with_status(StatusCode::PRECONDITION_FAILED)
            .with_body(json!({
                "error": {
                    "code": "Base.1.8.PreconditionFailed",
                    "message": "ETag does not match"
                }
            })),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    assert_eq!(system.etag(), Some(&ODataETag::from("W/\"1\"")));

    system.asset_tag = Some(Some("b".into()));
    system.update().await?;
    assert_eq!(system.etag(), Some(&ODataETag::from("W/\"2\"")));

    system.asset_tag = Some(Some("c".into()));
    let err = system
        .update()
        .await
        .err()
        .ok_or(Error::ExpectedProperty("conflict"))?;
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(err.status(), Some(StatusCode::PRECONDITION_FAILED));

    let if_match = bmc
        .requests_with(&Method::PATCH)
        .iter()
        .map(|r| r.headers.get(IF_MATCH).cloned())
        .collect::<Vec<_>>();
    assert_eq!(if_match.len(), 2);
    assert_eq!(if_match[0].as_ref().map(|v| v.as_bytes()), Some(&b"W/\"1\""[..]));
    assert_eq!(if_match[1].as_ref().map(|v| v.as_bytes()), Some(&b"W/\"2\""[..]));
    Ok(())
}

// Without `@odata.etag` in the body the `ETag` header is used.
#[test]
async fn etag_from_header() -> Result<(), Error> {
    let (_, client) = client([Expect::get(SYSTEM, computer_system(SYSTEM, &json!({})))
        .with_header("ETag", "\"abc\"")]);
    let system = client.get::<ComputerSystem>(&system_id()).await?;
    assert_eq!(system.etag().map(ODataETag::as_str), Some("\"abc\""));
    Ok(())
}

// Forced and unconditional writes omit `If-Match`.
#[test]
async fn forced_write_omits_if_match() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(
            SYSTEM,
            computer_system(SYSTEM, &json!({ ODATA_ETAG: "W/\"1\"", "AssetTag": "a" })),
        ),
        Expect::patch(SYSTEM, json!({"AssetTag": "b"}), ""),
        Expect::patch(SYSTEM, json!({"AssetTag": "c"}), ""),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    system.asset_tag = Some(Some("b".into()));
    system
        .update_with(UpdateOptions::new().force_write(true))
        .await?;
    system.disable_etag_match();
    system.asset_tag = Some(Some("c".into()));
    system.update().await?;
    assert!(bmc
        .requests_with(&Method::PATCH)
        .iter()
        .all(|r| r.headers.get(IF_MATCH).is_none()));
    Ok(())
}

// A PATCH answered with the full resource replaces the local state.
#[test]
async fn patch_response_resource_is_adopted() -> Result<(), Error> {
    let updated = computer_system(
        SYSTEM,
        &json!({ ODATA_ETAG: "W/\"7\"", "AssetTag": "new", "HostName": "set-by-service" }),
    );
    let (_, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({"AssetTag": "old"}))),
        Expect::patch(SYSTEM, json!({"AssetTag": "new"}), &updated),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    system.asset_tag = Some(Some("new".into()));
    system.update().await?;
    assert_eq!(system.host_name, Some(Some("set-by-service".into())));
    assert_eq!(system.etag(), Some(&ODataETag::from("W/\"7\"")));
    assert_eq!(system.raw(), updated.to_string().as_bytes());
    Ok(())
}

// Warning messages on a successful PATCH report a partial application.
#[test]
async fn partial_patch_is_reported() -> Result<(), Error> {
    let (_, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({"AssetTag": "a", "HostName": "h"}))),
        Expect::patch(
            SYSTEM,
            json!({"AssetTag": "b", "HostName": "x"}),
            json!({
                "@Message.ExtendedInfo": [{
                    "MessageId": "Base.1.8.PropertyNotWritable",
                    "Severity": "Warning",
                    "RelatedProperties": ["#/HostName"]
                }]
            }),
        ),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    system.asset_tag = Some(Some("b".into()));
    system.host_name = Some(Some("x".into()));
    match system.update().await? {
        UpdateOutcome::PartiallyApplied { extended_info } => {
            assert_eq!(extended_info.len(), 1);
            assert_eq!(extended_info[0].message_id, "Base.1.8.PropertyNotWritable");
            assert_eq!(extended_info[0].related_properties, vec!["#/HostName".to_string()]);
        }
        other => return Err(Error::Unexpected(format!("{other:?}"))),
    }
    Ok(())
}

// Refresh replaces value, bytes and tag; local edits are discarded.
#[test]
async fn refresh_rereads_resource() -> Result<(), Error> {
    let fresh = computer_system(SYSTEM, &json!({ ODATA_ETAG: "W/\"9\"", "AssetTag": "server" }));
    let (bmc, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({"AssetTag": "old"}))),
        Expect::get(SYSTEM, &fresh),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    system.asset_tag = Some(Some("local".into()));
    system.refresh().await?;
    assert_eq!(system.asset_tag, Some(Some("server".into())));
    assert_eq!(system.etag(), Some(&ODataETag::from("W/\"9\"")));
    assert!(system.update().await?.is_unchanged());
    assert_eq!(bmc.remaining(), 0);
    Ok(())
}

// Delete is conditional on the known tag and may hand over a task.
#[test]
async fn delete_resource() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({ ODATA_ETAG: "W/\"3\"" }))),
        Expect::delete(SYSTEM),
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({}))),
        Expect::delete(SYSTEM)
            .with_status(StatusCode::ACCEPTED)
            .with_header("Location", "/redfish/v1/TaskService/Tasks/7"),
    ]);
    let system = client.get::<ComputerSystem>(&system_id()).await?;
    assert!(system.delete().await?.is_none());
    let deletes = bmc.requests_with(&Method::DELETE);
    assert_eq!(
        deletes[0].headers.get(IF_MATCH).map(|v| v.as_bytes()),
        Some(&b"W/\"3\""[..])
    );

    let system = client.get::<ComputerSystem>(&system_id()).await?;
    let task = system
        .delete()
        .await?
        .ok_or(Error::ExpectedProperty("task monitor"))?;
    assert_eq!(task.location.as_str(), "/redfish/v1/TaskService/Tasks/7");
    Ok(())
}

// Writable objects are sent as a whole when anything inside changes.
#[test]
async fn nested_object_is_sent_whole() -> Result<(), Error> {
    let boot = json!({
        "BootSourceOverrideEnabled": "Disabled",
        "BootSourceOverrideTarget": "None",
        "BootSourceOverrideTarget@Redfish.AllowableValues": ["None", "Pxe"]
    });
    let expected = json_merge([&boot, &json!({"BootSourceOverrideTarget": "Pxe"})]);
    let (_, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({ "Boot": boot }))),
        Expect::patch(SYSTEM, json!({ "Boot": expected }), ""),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    if let Some(boot) = system.boot.as_mut() {
        boot.boot_source_override_target = Some(Some("Pxe".into()));
    }
    system.update().await?;
    Ok(())
}

// An asynchronous PATCH hands over its task monitor; the edit stays
// pending locally.
#[test]
async fn accepted_patch_returns_task_monitor() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({"AssetTag": "old"}))),
        Expect::patch(SYSTEM, json!({"AssetTag": "new"}), "")
            .with_status(StatusCode::ACCEPTED)
            .with_header("Location", "/redfish/v1/TaskService/TaskMonitors/4")
            .with_header("Retry-After", "2"),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    system.asset_tag = Some(Some("new".into()));
    let outcome = system.update().await?;
    let info = outcome
        .task_monitor()
        .ok_or(Error::ExpectedProperty("task monitor"))?;
    assert_eq!(info.location.as_str(), "/redfish/v1/TaskService/TaskMonitors/4");
    assert_eq!(info.retry_after, Some(std::time::Duration::from_secs(2)));
    assert!(outcome.extended_info().is_empty());
    assert_eq!(
        system.patch_payload()?,
        json!({"AssetTag": "new"}).as_object().cloned()
    );
    assert_eq!(bmc.requests_with(&Method::PATCH).len(), 1);
    Ok(())
}

// A resource echo that does not decode is reported, but the values the
// service accepted become the new baseline.
#[test]
async fn undecodable_patch_echo_keeps_sent_values() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({"AssetTag": "old"}))),
        Expect::patch(
            SYSTEM,
            json!({"AssetTag": "new"}),
            json!({"@odata.id": SYSTEM, "AssetTag": 42}),
        )
        .with_header("ETag", "W/\"5\""),
    ]);
    let mut system = client.get::<ComputerSystem>(&system_id()).await?;
    system.asset_tag = Some(Some("new".into()));
    let err = system
        .update()
        .await
        .err()
        .ok_or(Error::ExpectedProperty("decode error"))?;
    assert_eq!(err.kind(), ErrorKind::Encoding);
    assert_eq!(system.etag(), Some(&ODataETag::from("W/\"5\"")));
    assert!(system.update().await?.is_unchanged());
    assert_eq!(bmc.requests_with(&Method::PATCH).len(), 1);
    Ok(())
}
