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

//! Actions, creation and task monitoring.

use fishbind::composition_service::ComposeRequest;
use fishbind::composition_service::ComposeRequestType;
use fishbind::composition_service::CompositionService;
use fishbind::composition_service::CompositionServiceExt as _;
use fishbind::computer_system::ComputerSystem;
use fishbind::computer_system::ComputerSystemExt as _;
use fishbind::computer_system::ResetType;
use fishbind::drive::Drive;
use fishbind::drive::DriveExt as _;
use fishbind::endpoint::Endpoint;
use fishbind::volume::InitializeType;
use fishbind::volume::Volume;
use fishbind::volume::VolumeExt as _;
use fishbind::zone::EndpointRequest;
use fishbind::zone::Zone;
use fishbind::zone::ZoneExt as _;
use fishbind::ActionOutcome;
use fishbind::Created;
use fishbind::ErrorKind;
use fishbind::ODataId;
use fishbind::TaskMonitor;
use fishbind::TaskMonitorConfig;
use fishbind::TaskMonitorInfo;
use fishbind::TaskState;
use fishbind_core::CancellationToken;
use fishbind_core::TaskStatus;
use fishbind_tests::client;
use fishbind_tests::fixtures::composition_service;
use fishbind_tests::fixtures::computer_system;
use fishbind_tests::fixtures::drive;
use fishbind_tests::fixtures::endpoint;
use fishbind_tests::fixtures::task;
use fishbind_tests::fixtures::volume;
use fishbind_tests::fixtures::zone;
use fishbind_tests::fixtures::COMPOSITION_SERVICE;
use fishbind_tests::fixtures::DRIVE;
use fishbind_tests::fixtures::ENDPOINT;
use fishbind_tests::fixtures::SYSTEM;
use fishbind_tests::fixtures::SYSTEMS;
use fishbind_tests::fixtures::TASK;
use fishbind_tests::fixtures::ZONE;
use fishbind_tests::Error;
use fishbind_tests::Expect;
use http::header::IF_MATCH;
use http::Method;
use http::StatusCode;
use serde_json::json;
use std::time::Duration;
use tokio::test;

const COMPOSE_TARGET: &str = "/redfish/v1/CompositionService/Actions/CompositionService.Compose";
const ADD_ENDPOINT_TARGET: &str = "/redfish/v1/Fabrics/1/Zones/1/Actions/Zone.AddEndpoint";
const REMOVE_ENDPOINT_TARGET: &str = "/redfish/v1/Fabrics/1/Zones/1/Actions/Zone.RemoveEndpoint";

fn fast_polling() -> TaskMonitorConfig {
    TaskMonitorConfig::new()
        .poll_interval(Duration::from_millis(100))
        .jitter(0.0)
        .min_interval(Duration::from_millis(1))
}

fn accepted(uri: &str, request: serde_json::Value) -> Expect {
    Expect::post(uri, request, "")
        .with_status(StatusCode::ACCEPTED)
        .with_header("Location", TASK)
}

fn manifest() -> serde_json::Value {
    json!({
        "Description": "Specific composition example",
        "Elements": [{
            "@odata.type": "#Manifest.v1_1_0.Manifest",
            "ResourceBlockLimits": {"MinCompute": 1, "MaxCompute": 1},
            "OneTimeResourceBlocks": [
                { "@odata.id": "/redfish/v1/CompositionService/ResourceBlocks/ComputeBlock0" }
            ]
        }]
    })
}

// Compose is accepted and tracked to completion through the task
// monitor.
#[test(start_paused = true)]
async fn compose_runs_to_completion() -> Result<(), Error> {
    let (bmc, client) = client([
        Expect::get(COMPOSITION_SERVICE, composition_service()),
        accepted(
            COMPOSE_TARGET,
            json!({
                "RequestType": "Apply",
                "RequestFormat": "Manifest",
                "Manifest": manifest()
            }),
        ),
        Expect::get_raw(TASK, "").with_status(StatusCode::ACCEPTED),
        Expect::get(TASK, task("Running", "OK", 50)),
        Expect::get(TASK, task("Completed", "OK", 100)),
    ]);
    let service = client
        .get::<CompositionService>(&ODataId::from(COMPOSITION_SERVICE))
        .await?;
    let outcome = service
        .compose(&ComposeRequest::manifest(ComposeRequestType::Apply, manifest()))
        .await?;
    let info = outcome
        .task()
        .cloned()
        .ok_or(Error::ExpectedProperty("task monitor"))?;
    assert_eq!(info.location.as_str(), TASK);

    let mut seen = Vec::new();
    let report = TaskMonitor::new(client.clone(), info)
        .with_config(fast_polling())
        .wait_with_progress(|task| seen.push(task.percent_complete))
        .await?;
    assert_eq!(report.state(), Some(TaskState::Completed));
    assert_eq!(report.status(), Some(TaskStatus::Ok));
    assert_eq!(report.polls, 3);
    assert!(report.regressions.is_empty());
    assert_eq!(seen, vec![Some(50), Some(100)]);
    assert_eq!(bmc.remaining(), 0);
    Ok(())
}

// A task ending in Exception is reported, not turned into an error.
#[test(start_paused = true)]
async fn task_exception_is_terminal() -> Result<(), Error> {
    let (_, client) = client([
        Expect::get(TASK, task("Running", "OK", 60)),
        Expect::get(TASK, task("Running", "OK", 40)),
        Expect::get(TASK, task("Exception", "Critical", 40)),
    ]);
    let info = TaskMonitorInfo {
        location: ODataId::from(TASK),
        retry_after: None,
        task: None,
    };
    let report = TaskMonitor::new(client, info)
        .with_config(fast_polling())
        .wait()
        .await?;
    assert_eq!(report.state(), Some(TaskState::Exception));
    assert_eq!(report.status(), Some(TaskStatus::Critical));
    assert_eq!(report.regressions.len(), 1);
    assert_eq!((report.regressions[0].from, report.regressions[0].to), (60, 40));
    Ok(())
}

// Operation result served at the monitor URI ends polling.
#[test(start_paused = true)]
async fn final_response_ends_polling() -> Result<(), Error> {
    let (_, client) = client([
        Expect::get(TASK, task("Running", "OK", 10)),
        Expect::get(TASK, computer_system(SYSTEM, &json!({}))),
    ]);
    let info = TaskMonitorInfo {
        location: ODataId::from(TASK),
        retry_after: None,
        task: None,
    };
    let report = TaskMonitor::new(client, info)
        .with_config(fast_polling())
        .wait()
        .await?;
    assert_eq!(report.state(), Some(TaskState::Running));
    let response = report
        .final_response
        .ok_or(Error::ExpectedProperty("final response"))?;
    assert_eq!(response.status, StatusCode::OK);
    Ok(())
}

// Deadline yields a timeout carrying the last task seen.
#[test(start_paused = true)]
async fn task_deadline() -> Result<(), Error> {
    let (_, client) = client((0..20).map(|_| Expect::get(TASK, task("Running", "OK", 10))));
    let info = TaskMonitorInfo {
        location: ODataId::from(TASK),
        retry_after: None,
        task: None,
    };
    let err = TaskMonitor::new(client, info)
        .with_config(fast_polling().deadline(Duration::from_secs(1)))
        .wait()
        .await
        .err()
        .ok_or(Error::ExpectedProperty("timeout"))?;
    assert_eq!(err.kind(), ErrorKind::Timeout);
    assert_eq!(
        err.last_task().and_then(|t| t.task_state),
        Some(TaskState::Running)
    );
    Ok(())
}

// Abort stops polling and, when configured, deletes the task.
#[test(start_paused = true)]
async fn task_abort() -> Result<(), Error> {
    let (bmc, client) = client(
        (0..5)
            .map(|_| Expect::get(TASK, task("Running", "OK", 10)))
            .chain(std::iter::once(Expect::delete(TASK))),
    );
    let info = TaskMonitorInfo {
        location: ODataId::from(TASK),
        retry_after: None,
        task: None,
    };
    let token = CancellationToken::new();
    let canceller = token.clone();
    let err = TaskMonitor::new(client, info)
        .with_config(fast_polling().delete_on_cancel(true))
        .with_abort(token)
        .wait_with_progress(move |_| canceller.cancel())
        .await
        .err()
        .ok_or(Error::ExpectedProperty("cancelled"))?;
    assert_eq!(err.kind(), ErrorKind::Cancelled);
    assert_eq!(
        err.last_task().and_then(|t| t.task_state),
        Some(TaskState::Running)
    );
    assert_eq!(bmc.requests_with(&Method::GET).len(), 1);
    assert_eq!(bmc.requests_with(&Method::DELETE).len(), 1);
    Ok(())
}

// Retry-After of the accepted response is kept with the monitor.
#[test]
async fn accepted_retry_after() -> Result<(), Error> {
    let (_, client) = client([
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({
            "Actions": {
                "#ComputerSystem.Reset": {
                    "target": "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset"
                }
            }
        }))),
        Expect::post(
            "/redfish/v1/Systems/1/Actions/ComputerSystem.Reset",
            json!({"ResetType": "ForceRestart"}),
            "",
        )
        .with_status(StatusCode::ACCEPTED)
        .with_header("Location", TASK)
        .with_header("Retry-After", "5"),
    ]);
    let system = client.get::<ComputerSystem>(&ODataId::from(SYSTEM)).await?;
    let outcome = system.reset(ResetType::ForceRestart).await?;
    let info = outcome.task().ok_or(Error::ExpectedProperty("task"))?;
    assert_eq!(info.retry_after, Some(Duration::from_secs(5)));
    assert_eq!(info.monitor_uri().as_str(), TASK);
    Ok(())
}

// Adding an endpoint carries both concurrency tags; a stale tag is a
// conflict.
#[test]
async fn zone_add_endpoint() -> Result<(), Error> {
    let request = json!({
        "Endpoint": { "@odata.id": ENDPOINT },
        "EndpointETag": "W/\"e1\"",
        "ZoneETag": "W/\"z1\""
    });
    let (bmc, client) = client([
        Expect::get(ZONE, zone("W/\"z1\"")),
        Expect::get(ENDPOINT, endpoint(ENDPOINT, "W/\"e1\"")),
        Expect::post(ADD_ENDPOINT_TARGET, &request, ""),
        Expect::post(ADD_ENDPOINT_TARGET, &request, json!({
            "error": {
                "code": "Base.1.8.PreconditionFailed",
                "message": "ETag does not match"
            }
        }))
        .with_status(StatusCode::PRECONDITION_FAILED),
    ]);
    let zone = client.get::<Zone>(&ODataId::from(ZONE)).await?;
    let endpoint = client.get::<Endpoint>(&ODataId::from(ENDPOINT)).await?;
    let request = zone.endpoint_request(&endpoint);
    assert!(matches!(
        zone.add_endpoint(&request).await?,
        ActionOutcome::NoContent
    ));
    let err = zone
        .add_endpoint(&request)
        .await
        .err()
        .ok_or(Error::ExpectedProperty("conflict"))?;
    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert_eq!(
        err.redfish_error().map(|e| e.code.as_str()),
        Some("Base.1.8.PreconditionFailed")
    );
    let posts = bmc.requests_with(&Method::POST);
    assert!(posts.iter().all(|r| r.headers.get(IF_MATCH).is_none()));
    Ok(())
}

// Removal without tags sends the endpoint only.
#[test]
async fn zone_remove_endpoint() -> Result<(), Error> {
    let (_, client) = client([
        Expect::get(ZONE, zone("W/\"z1\"")),
        Expect::post(
            REMOVE_ENDPOINT_TARGET,
            json!({ "Endpoint": { "@odata.id": ENDPOINT } }),
            "",
        ),
        Expect::get("/redfish/v1/Fabrics/1/Zones/0", json!({
            "@odata.id": "/redfish/v1/Fabrics/1/Zones/0",
            "@odata.type": "#Zone.v1_6_1.Zone",
            "Id": "0",
            "Name": "Zone 0",
            "ZoneType": "ZoneOfZones"
        })),
    ]);
    let zone = client.get::<Zone>(&ODataId::from(ZONE)).await?;
    zone.remove_endpoint(&EndpointRequest::new(ODataId::from(ENDPOINT)))
        .await?;
    let parents = zone.contained_by_zones().await;
    assert!(parents.is_complete());
    assert_eq!(parents.successes[0].odata_id().as_str(), "/redfish/v1/Fabrics/1/Zones/0");
    assert!(zone.contains_zones().await.successes.is_empty());
    Ok(())
}

// Actions the resource does not advertise fail locally.
#[test]
async fn action_not_advertised() -> Result<(), Error> {
    let mut served = drive();
    if let Some(obj) = served.as_object_mut() {
        obj.remove("Actions");
    }
    let (bmc, client) = client([
        Expect::get(DRIVE, served),
        Expect::get(SYSTEM, computer_system(SYSTEM, &json!({}))),
    ]);
    let drive = client.get::<Drive>(&ODataId::from(DRIVE)).await?;
    let err = drive
        .secure_erase()
        .await
        .err()
        .ok_or(Error::ExpectedProperty("not supported"))?;
    assert_eq!(err.kind(), ErrorKind::NotSupported);

    let system = client.get::<ComputerSystem>(&ODataId::from(SYSTEM)).await?;
    let err = system
        .reset(ResetType::On)
        .await
        .err()
        .ok_or(Error::ExpectedProperty("not supported"))?;
    assert_eq!(err.kind(), ErrorKind::NotSupported);
    assert!(bmc.requests_with(&Method::POST).is_empty());
    Ok(())
}

// Advertised actions post their parameters to the action target.
#[test]
async fn advertised_actions() -> Result<(), Error> {
    let (_, client) = client([
        Expect::get(DRIVE, drive()),
        Expect::post(
            "/redfish/v1/Chassis/NVMeChassis/Disk.Bay.0/Actions/Drive.SecureErase",
            json!({}),
            "",
        ),
        Expect::get("/redfish/v1/Volumes/Volume-1", volume()),
        Expect::post(
            "/redfish/v1/Volumes/Volume-1/Actions/Volume.Initialize",
            json!({"InitializeType": "Fast"}),
            "",
        ),
    ]);
    let drive = client.get::<Drive>(&ODataId::from(DRIVE)).await?;
    assert!(matches!(drive.secure_erase().await?, ActionOutcome::NoContent));

    let volume = client
        .get::<Volume>(&ODataId::from("/redfish/v1/Volumes/Volume-1"))
        .await?;
    let initialize = volume
        .actions
        .as_ref()
        .and_then(|a| a.initialize.as_ref())
        .ok_or(Error::ExpectedProperty("Initialize"))?;
    assert!(initialize.is_allowed("InitializeType", "Fast"));
    assert!(!initialize.is_allowed("InitializeType", "Medium"));
    volume.initialize(Some(InitializeType::Fast)).await?;
    Ok(())
}

// Creation reports the new resource, its location, or a task.
#[test]
async fn create_member() -> Result<(), Error> {
    let new_member = "/redfish/v1/Systems/2";
    let body = json!({"Name": "2"});
    let (_, client) = client([
        Expect::post(SYSTEMS, &body, "")
            .with_status(StatusCode::CREATED)
            .with_header("Location", new_member),
        Expect::post(SYSTEMS, &body, computer_system(new_member, &json!({})))
            .with_status(StatusCode::CREATED),
        Expect::post(SYSTEMS, &body, "")
            .with_status(StatusCode::ACCEPTED)
            .with_header("Location", TASK),
    ]);
    let collection = ODataId::from(SYSTEMS);
    match client.create::<_, ComputerSystem>(&collection, &body).await? {
        Created::Location(id) => assert_eq!(id.as_str(), new_member),
        other => return Err(Error::Unexpected(format!("{other:?}"))),
    }
    match client.create::<_, ComputerSystem>(&collection, &body).await? {
        Created::Entity(system) => assert_eq!(system.odata_id().as_str(), new_member),
        other => return Err(Error::Unexpected(format!("{other:?}"))),
    }
    match client.create::<_, ComputerSystem>(&collection, &body).await? {
        Created::Accepted(info) => assert_eq!(info.location.as_str(), TASK),
        other => return Err(Error::Unexpected(format!("{other:?}"))),
    }
    Ok(())
}
