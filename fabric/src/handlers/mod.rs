//! The HA & sharding handler library (§4.F): one `Handler` impl per RPC
//! command, registered against the dispatcher at process init.

mod group;
mod server;
mod sharding;
mod support;

use std::sync::Arc;

use crate::events::{Dispatcher, EventId};

/// Register every handler against its event. Called once from `main` (or
/// test setup) — never as a module-load side effect (Design Note 9.1).
pub fn register_all(dispatcher: &Dispatcher) {
    dispatcher.on_event(EventId::GroupCreate, Arc::new(group::GroupCreate));
    dispatcher.on_event(EventId::GroupDestroy, Arc::new(group::GroupDestroy));
    dispatcher.on_event(EventId::GroupAdd, Arc::new(group::GroupAdd));
    dispatcher.on_event(EventId::GroupRemove, Arc::new(group::GroupRemove));
    dispatcher.on_event(EventId::GroupPromote, Arc::new(group::GroupPromote));
    dispatcher.on_event(EventId::GroupDemote, Arc::new(group::GroupDemote));
    dispatcher.on_event(EventId::GroupLookupGroups, Arc::new(group::GroupLookupGroups));
    dispatcher.on_event(EventId::GroupLookupServers, Arc::new(group::GroupLookupServers));
    dispatcher.on_event(EventId::GroupDescription, Arc::new(group::GroupDescription));
    dispatcher.on_event(EventId::ServerLookupUuid, Arc::new(server::ServerLookupUuid));
    dispatcher.on_event(
        EventId::ShardingCreateDefinition,
        Arc::new(sharding::CreateDefinition),
    );
    dispatcher.on_event(
        EventId::ShardingRemoveDefinition,
        Arc::new(sharding::RemoveDefinition),
    );
    dispatcher.on_event(EventId::ShardingAddTable, Arc::new(sharding::AddTable));
    dispatcher.on_event(EventId::ShardingRemoveTable, Arc::new(sharding::RemoveTable));
    dispatcher.on_event(EventId::ShardingAddShard, Arc::new(sharding::AddShard));
    dispatcher.on_event(EventId::ShardingRemoveShard, Arc::new(sharding::RemoveShard));
    dispatcher.on_event(EventId::ShardingEnableShard, Arc::new(sharding::EnableShard));
    dispatcher.on_event(EventId::ShardingDisableShard, Arc::new(sharding::DisableShard));
    dispatcher.on_event(EventId::ShardingLookupServers, Arc::new(sharding::LookupServers));
}
