// Copyright Exograph, Inc. All rights reserved.
//
// Use of this software is governed by the Business Source License
// included in the LICENSE file at the root of this repository.
//
// As of the Change Date specified in that file, in accordance with
// the Business Source License, use of this software will be governed
// by the Apache License, Version 2.0.

pub const MRP_API_URL: &str = "MRP_API_URL";
pub const MRP_AUTH_TOKEN: &str = "MRP_AUTH_TOKEN";

pub const MRP_PUBLIC_ENDPOINTS: &str = "MRP_PUBLIC_ENDPOINTS";
pub const MRP_UPLOAD_MARKERS: &str = "MRP_UPLOAD_MARKERS";
pub const MRP_AUTH_FAILURE_CODE: &str = "MRP_AUTH_FAILURE_CODE";

pub const MRP_REQUEST_TIMEOUT_SECS: &str = "MRP_REQUEST_TIMEOUT_SECS";
