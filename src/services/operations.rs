// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! GraphQL operation catalog.
//!
//! Operation and field names are wire contract; they must match the backend
//! schema exactly (including its spellings). Routing between the gateway
//! and the live channel is decided by operation shape, never by name.

/// How an operation travels: request/response over HTTP, or streaming over
/// the persistent channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    /// Classify a GraphQL document by its leading keyword. Anonymous
    /// shorthand documents are queries.
    pub fn classify(document: &str) -> Self {
        let trimmed = document.trim_start();
        if trimmed.starts_with("subscription") {
            OperationKind::Subscription
        } else if trimmed.starts_with("mutation") {
            OperationKind::Mutation
        } else {
            OperationKind::Query
        }
    }

    /// True for operations routed over the persistent channel.
    pub fn is_streaming(self) -> bool {
        self == OperationKind::Subscription
    }
}

/// One named backend operation.
#[derive(Debug, Clone, Copy)]
pub struct OperationSpec {
    /// Operation name sent alongside the document
    pub name: &'static str,
    /// Field under `data` carrying the response envelope
    pub field: &'static str,
    /// The GraphQL document
    pub document: &'static str,
    /// Envelope code meaning success, where the contract defines one.
    /// `None` means any envelope carrying data is accepted.
    pub success_code: Option<&'static str>,
}

impl OperationSpec {
    pub fn kind(&self) -> OperationKind {
        OperationKind::classify(self.document)
    }
}

/// 30-minute registration buckets over a time range (unix seconds).
pub const USER_COUNT_BUCKETS: OperationSpec = OperationSpec {
    name: "GetUserCount30MinuteBucketsInRange",
    field: "getUserCount30MinuteBucketsInRange",
    document: "query GetUserCount30MinuteBucketsInRange($startTime: Float!, $endTime: Float!) {\n    getUserCount30MinuteBucketsInRange(startTime: $startTime, endTime: $endTime)\n}",
    success_code: Some("CODE-013"),
};

/// Current site lockdown configuration.
pub const SITE_CONFIG: OperationSpec = OperationSpec {
    name: "IsEnable",
    field: "isEnable",
    document: "query IsEnable {\n    isEnable\n}",
    success_code: Some("CODE-4001"),
};

/// Flip the site lockdown switch.
pub const SITE_CONFIG_UPDATE: OperationSpec = OperationSpec {
    name: "SiteEnable",
    field: "siteEnable",
    document: "mutation SiteEnable($state: Boolean!, $timestamp: Float!) {\n    siteEnable(state: $state, timestamp: $timestamp)\n}",
    success_code: Some("CODE-4003"),
};

/// Gender split. The backend schema spells it this way.
pub const GENDER_SPLIT: OperationSpec = OperationSpec {
    name: "FindMaleVsFemail",
    field: "findMaleVsFemail",
    document: "query FindMaleVsFemail {\n    findMaleVsFemail\n}",
    success_code: Some("CODE-4005"),
};

/// Age distribution with percentages.
pub const AGE_DISTRIBUTION: OperationSpec = OperationSpec {
    name: "FindAgeDistribution",
    field: "findAgeDistributionWithPercentage",
    document: "query FindAgeDistribution {\n    findAgeDistributionWithPercentage\n}",
    success_code: Some("CODE-4006"),
};

/// Paginated user listing with optional search.
pub const USERS: OperationSpec = OperationSpec {
    name: "GetUsers",
    field: "getUsers",
    document: "query GetUsers($searchTerm: String, $paginateRequest: PaginateRequestInput!) {\n    getUsers(paginateRequest: $paginateRequest, searchTerm: $searchTerm)\n}",
    success_code: None,
};

/// Activate or deactivate one user.
pub const USER_ACTIVATION: OperationSpec = OperationSpec {
    name: "UserActivation",
    field: "userActivation",
    document: "mutation UserActivation($userId: String!, $state: Boolean!) {\n    userActivation(userId: $userId, state: $state)\n}",
    success_code: None,
};

/// All events.
pub const EVENTS: OperationSpec = OperationSpec {
    name: "GetEvents",
    field: "getEvents",
    document: "query GetEvents {\n    getEvents\n}",
    success_code: Some("CODE-900"),
};

/// Zones of one event.
pub const ZONE_CONFIG: OperationSpec = OperationSpec {
    name: "GetZoneConfig",
    field: "getZoneConfig",
    document: "query GetZoneConfig($eventId: String!) {\n    getZoneConfig(eventId: $eventId)\n}",
    success_code: Some("CODE-700"),
};

/// All zones across all events.
pub const ALL_ZONES: OperationSpec = OperationSpec {
    name: "GetZones",
    field: "getZones",
    document: "query GetZones {\n    getZones\n}",
    success_code: Some("CODE-700"),
};

/// Create or update an event.
pub const SAVE_EVENT: OperationSpec = OperationSpec {
    name: "SaveEvent",
    field: "saveEvent",
    document: "mutation SaveEvent($eventId: String, $event: EventInput!) {\n    saveEvent(eventId: $eventId, event: $event)\n}",
    success_code: None,
};

/// Delete an event.
pub const DELETE_EVENT: OperationSpec = OperationSpec {
    name: "DeleteEvent",
    field: "deleteEvent",
    document: "mutation DeleteEvent($eventId: String!) {\n    deleteEvent(eventId: $eventId)\n}",
    success_code: None,
};

/// Create or update a zone.
pub const SAVE_ZONE: OperationSpec = OperationSpec {
    name: "SaveZone",
    field: "saveZone",
    document: "mutation SaveZone($zoneId: String, $zone: ZoneInput!) {\n    saveZone(zoneId: $zoneId, zone: $zone)\n}",
    success_code: None,
};

/// Delete a zone.
pub const DELETE_ZONE: OperationSpec = OperationSpec {
    name: "DeleteZone",
    field: "deleteZone",
    document: "mutation DeleteZone($zoneId: String!) {\n    deleteZone(zoneId: $zoneId)\n}",
    success_code: None,
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_by_shape() {
        assert_eq!(OperationKind::classify("query GetEvents { x }"), OperationKind::Query);
        assert_eq!(
            OperationKind::classify("  mutation SiteEnable { x }"),
            OperationKind::Mutation
        );
        assert_eq!(
            OperationKind::classify("\nsubscription OnZoneChange { x }"),
            OperationKind::Subscription
        );
        // Anonymous shorthand is a query.
        assert_eq!(OperationKind::classify("{ x }"), OperationKind::Query);
    }

    #[test]
    fn test_catalog_has_no_streaming_operations() {
        // Every catalogued operation is request/response; streaming
        // documents come from subscribers at runtime.
        for op in [
            USER_COUNT_BUCKETS,
            SITE_CONFIG,
            SITE_CONFIG_UPDATE,
            GENDER_SPLIT,
            AGE_DISTRIBUTION,
            USERS,
            USER_ACTIVATION,
            EVENTS,
            ZONE_CONFIG,
            ALL_ZONES,
            SAVE_EVENT,
            DELETE_EVENT,
            SAVE_ZONE,
            DELETE_ZONE,
        ] {
            assert!(!op.kind().is_streaming(), "{} must not stream", op.name);
        }
    }

    #[test]
    fn test_mutations_classify_as_mutations() {
        assert_eq!(SITE_CONFIG_UPDATE.kind(), OperationKind::Mutation);
        assert_eq!(USER_ACTIVATION.kind(), OperationKind::Mutation);
        assert_eq!(SITE_CONFIG.kind(), OperationKind::Query);
    }
}
