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

use crate::json_merge;
use crate::ODATA_ID;
use crate::ODATA_TYPE;
use serde_json::json;
use serde_json::Value;

pub const SYSTEMS: &str = "/redfish/v1/Systems";
pub const SYSTEM: &str = "/redfish/v1/Systems/1";
pub const DRIVE: &str = "/redfish/v1/Drive";
pub const ZONE: &str = "/redfish/v1/Fabrics/1/Zones/1";
pub const ENDPOINT: &str = "/redfish/v1/Fabrics/1/Endpoints/5";
pub const COMPOSITION_SERVICE: &str = "/redfish/v1/CompositionService";
pub const TASK: &str = "/redfish/v1/TaskService/Tasks/42";

pub const SYSTEM_DATA_TYPE: &str = "#ComputerSystem.v1_20_0.ComputerSystem";

/// Last path segment of `id`.
pub fn resource_name(id: &str) -> &str {
    id.rsplit('/').next().unwrap_or(id)
}

/// Computer system at `id` with `fields` merged over a minimal body.
pub fn computer_system(id: &str, fields: &Value) -> Value {
    let name = resource_name(id);
    json_merge([
        &json!({
            ODATA_ID: id,
            ODATA_TYPE: SYSTEM_DATA_TYPE,
            "Id": name,
            "Name": name,
            "Status": {
                "Health": "OK",
                "State": "Enabled"
            }
        }),
        fields,
    ])
}

/// Collection page.
pub fn collection(id: &str, members: &[&str], next_link: Option<&str>) -> Value {
    let members = members
        .iter()
        .map(|m| json!({ ODATA_ID: m }))
        .collect::<Vec<_>>();
    let mut page = json!({
        ODATA_ID: id,
        ODATA_TYPE: "#ComputerSystemCollection.ComputerSystemCollection",
        "Name": "Computer System Collection",
        "Members": members,
        "Members@odata.count": members.len(),
    });
    if let Some(next_link) = next_link {
        page["Members@odata.nextLink"] = json!(next_link);
    }
    page
}

/// Drive document as served by a storage service.
pub fn drive() -> Value {
    json!({
        "@odata.context": "/redfish/v1/$metadata#Drive.Drive",
        "@odata.type": "#Drive.v1_0_0.Drive",
        "@odata.id": "/redfish/v1/Drive",
        "Id": "Drive-1",
        "Name": "Drive One",
        "Description": "One drive",
        "Actions": {
            "#Drive.SecureErase": {
                "target": "/redfish/v1/Chassis/NVMeChassis/Disk.Bay.0/Actions/Drive.SecureErase"
            }
        },
        "Assembly": {
            "@odata.id": "/redfish/v1/Assembly/Assembly-1"
        },
        "AssetTag": "Asset 1",
        "BlockSizeBytes": 512,
        "CapableSpeedGbs": 40,
        "CapacityBytes": 1_099_511_627_776_u64,
        "EncryptionAbility": "SelfEncryptingDrive",
        "EncryptionStatus": "Unlocked",
        "FailurePredicted": false,
        "HotSpareMode": "Revertible",
        "HotSpareType": "Chassis",
        "Identifiers": [
            {
                "DurableName": "5000D3100101D52E",
                "DurableNameFormat": "FC_WWN"
            }
        ],
        "IndicatorLED": "Blinking",
        "Links": {
            "Chassis": {
                "@odata.id": "/redfish/v1/Chassis/Chassis-1"
            },
            "Endpoints": [],
            "Endpoints@odata.count": 0,
            "PCIeFunctions": [
                {
                    "@odata.id": "/redfish/v1/PCIeFunctions/PCIeFunction-1"
                }
            ],
            "PCIeFunctions@odata.count": 1,
            "Volumes": [
                {
                    "@odata.id": "/redfish/v1/Volumes/Volume-1"
                }
            ],
            "Volumes@odata.count": 1
        },
        "Manufacturer": "Joe's Storage",
        "MediaType": "SSD",
        "Model": "Storage One",
        "Multipath": true,
        "NegotiatedSpeedGbps": 10,
        "Operations": [],
        "PartNumber": "12345",
        "PhysicalLocation": {
            "PartLocation": {
                "LocationOrdinalValue": 0,
                "LocationType": "Slot"
            }
        },
        "PredictedMediaLifeLeftPercent": 100,
        "Protocol": "FC",
        "Revision": "2.0",
        "RotationSpeedRPM": 5200,
        "SKU": "123456",
        "SerialNumber": "1234567",
        "Status": {
            "State": "Enabled",
            "Health": "OK"
        },
        "StatusIndicator": "Hotspare",
        "WriteCacheEnabled": true
    })
}

/// Volume referenced by [`drive`].
pub fn volume() -> Value {
    json!({
        ODATA_ID: "/redfish/v1/Volumes/Volume-1",
        ODATA_TYPE: "#Volume.v1_9_0.Volume",
        "Id": "Volume-1",
        "Name": "Volume One",
        "CapacityBytes": 1_099_511_627_776_u64,
        "DisplayName": null,
        "RAIDType": "RAID1",
        "Links": {
            "Drives": [{ ODATA_ID: DRIVE }],
            "Drives@odata.count": 1
        },
        "Actions": {
            "#Volume.Initialize": {
                "target": "/redfish/v1/Volumes/Volume-1/Actions/Volume.Initialize",
                "InitializeType@Redfish.AllowableValues": ["Fast", "Slow"]
            }
        }
    })
}

/// Zone with one endpoint.
pub fn zone(etag: &str) -> Value {
    json!({
        ODATA_ID: ZONE,
        ODATA_TYPE: "#Zone.v1_6_1.Zone",
        "@odata.etag": etag,
        "Id": "1",
        "Name": "Zone 1",
        "ZoneType": "ZoneOfEndpoints",
        "DefaultRoutingEnabled": false,
        "Links": {
            "Endpoints": [{ ODATA_ID: "/redfish/v1/Fabrics/1/Endpoints/1" }],
            "Endpoints@odata.count": 1,
            "ContainedByZones": [{ ODATA_ID: "/redfish/v1/Fabrics/1/Zones/0" }]
        },
        "Actions": {
            "#Zone.AddEndpoint": {
                "target": "/redfish/v1/Fabrics/1/Zones/1/Actions/Zone.AddEndpoint"
            },
            "#Zone.RemoveEndpoint": {
                "target": "/redfish/v1/Fabrics/1/Zones/1/Actions/Zone.RemoveEndpoint"
            }
        }
    })
}

/// Fabric endpoint.
pub fn endpoint(id: &str, etag: &str) -> Value {
    json!({
        ODATA_ID: id,
        ODATA_TYPE: "#Endpoint.v1_8_0.Endpoint",
        "@odata.etag": etag,
        "Id": resource_name(id),
        "Name": "Endpoint",
        "EndpointProtocol": "PCIe",
        "ConnectedEntities": [{
            "EntityType": "Drive",
            "EntityRole": "Target",
            "EntityLink": { ODATA_ID: DRIVE }
        }]
    })
}

/// Composition service advertising `#CompositionService.Compose`.
pub fn composition_service() -> Value {
    json!({
        ODATA_ID: COMPOSITION_SERVICE,
        ODATA_TYPE: "#CompositionService.v1_2_0.CompositionService",
        "Id": "CompositionService",
        "Name": "Composition Service",
        "ServiceEnabled": true,
        "AllowOverprovisioning": false,
        "ResourceBlocks": { ODATA_ID: "/redfish/v1/CompositionService/ResourceBlocks" },
        "Actions": {
            "#CompositionService.Compose": {
                "target": "/redfish/v1/CompositionService/Actions/CompositionService.Compose",
                "RequestType@Redfish.AllowableValues": ["Preview", "PreviewReserve", "Apply"]
            }
        }
    })
}

/// Task in `state`.
pub fn task(state: &str, status: &str, percent: i64) -> Value {
    json!({
        ODATA_ID: TASK,
        ODATA_TYPE: "#Task.v1_7_0.Task",
        "Id": "42",
        "Name": "Task 42",
        "TaskState": state,
        "TaskStatus": status,
        "PercentComplete": percent
    })
}
