//! The circle registry — creation, scope management, and membership.

use crate::error::CircleError;
use poline_staking::StakingEngine;
use poline_types::{Address, EntityId, ProposalScope, ScopeSet, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use tracing::info;

/// Notifications emitted by the registry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CircleEvent {
    CircleCreated {
        id: EntityId,
        name: String,
        scopes: u32,
        required_stake: u128,
    },
    CircleUpdated {
        id: EntityId,
        scopes: u32,
        required_stake: u128,
    },
    CircleDeactivated {
        id: EntityId,
    },
    MemberAdded {
        circle: EntityId,
        member: Address,
    },
    MemberRemoved {
        circle: EntityId,
        member: Address,
    },
}

/// A named membership group with a scope bitmask.
///
/// Members are kept both as an insertion-ordered list (for deterministic
/// enumeration) and as a set (for O(1) membership checks).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Circle {
    pub id: EntityId,
    pub name: String,
    pub scopes: ScopeSet,
    pub required_stake: u128,
    pub active: bool,
    pub created_at: Timestamp,
    members: Vec<Address>,
    member_set: HashSet<Address>,
}

impl Circle {
    pub fn members(&self) -> &[Address] {
        &self.members
    }

    pub fn is_member(&self, who: &Address) -> bool {
        self.member_set.contains(who)
    }

    fn insert_member(&mut self, who: Address) -> bool {
        if !self.member_set.insert(who.clone()) {
            return false;
        }
        self.members.push(who);
        true
    }

    fn remove_member(&mut self, who: &Address) -> bool {
        if !self.member_set.remove(who) {
            return false;
        }
        self.members.retain(|m| m != who);
        true
    }
}

/// Registry of all circles plus a reverse membership index.
pub struct CircleRegistry {
    admin: Address,
    circles: HashMap<EntityId, Circle>,
    memberships: HashMap<Address, HashSet<EntityId>>,
    pending_events: Vec<CircleEvent>,
}

impl CircleRegistry {
    pub fn new(admin: Address) -> Self {
        Self {
            admin,
            circles: HashMap::new(),
            memberships: HashMap::new(),
            pending_events: Vec::new(),
        }
    }

    fn require_admin(&self, caller: &Address) -> Result<(), CircleError> {
        if *caller != self.admin {
            return Err(CircleError::Unauthorized(caller.to_string()));
        }
        Ok(())
    }

    /// Create a new circle. The id is derived from the name, creator and
    /// timestamp; an exact collision means the same circle already exists.
    pub fn create_circle(
        &mut self,
        caller: &Address,
        name: &str,
        scopes: ScopeSet,
        required_stake: u128,
        now: Timestamp,
    ) -> Result<EntityId, CircleError> {
        self.require_admin(caller)?;
        if name.trim().is_empty() {
            return Err(CircleError::EmptyName);
        }
        if scopes.is_empty() {
            return Err(CircleError::EmptyScopes);
        }
        let id = EntityId::derive("circle", name.as_bytes(), caller, now);
        if self.circles.contains_key(&id) {
            return Err(CircleError::DuplicateCircle(id));
        }

        self.circles.insert(
            id,
            Circle {
                id,
                name: name.to_string(),
                scopes,
                required_stake,
                active: true,
                created_at: now,
                members: Vec::new(),
                member_set: HashSet::new(),
            },
        );
        info!(circle = %id, name, "circle created");
        self.pending_events.push(CircleEvent::CircleCreated {
            id,
            name: name.to_string(),
            scopes: scopes.bits(),
            required_stake,
        });
        Ok(id)
    }

    /// Replace a circle's scopes and stake requirement. Existing members are
    /// unaffected; the new requirement applies to future joins only.
    pub fn update_circle(
        &mut self,
        caller: &Address,
        id: EntityId,
        scopes: ScopeSet,
        required_stake: u128,
    ) -> Result<(), CircleError> {
        self.require_admin(caller)?;
        if scopes.is_empty() {
            return Err(CircleError::EmptyScopes);
        }
        let circle = self.circles.get_mut(&id).ok_or(CircleError::NotFound(id))?;
        circle.scopes = scopes;
        circle.required_stake = required_stake;
        self.pending_events.push(CircleEvent::CircleUpdated {
            id,
            scopes: scopes.bits(),
            required_stake,
        });
        Ok(())
    }

    /// Deactivate a circle. Membership records are retained for audit but the
    /// circle no longer authorizes anything.
    pub fn deactivate_circle(&mut self, caller: &Address, id: EntityId) -> Result<(), CircleError> {
        self.require_admin(caller)?;
        let circle = self.circles.get_mut(&id).ok_or(CircleError::NotFound(id))?;
        if !circle.active {
            return Err(CircleError::Inactive(id));
        }
        circle.active = false;
        info!(circle = %id, "circle deactivated");
        self.pending_events.push(CircleEvent::CircleDeactivated { id });
        Ok(())
    }

    /// Administratively add a member, bypassing the stake requirement.
    pub fn add_member(
        &mut self,
        caller: &Address,
        id: EntityId,
        member: Address,
    ) -> Result<(), CircleError> {
        self.require_admin(caller)?;
        let circle = self.circles.get_mut(&id).ok_or(CircleError::NotFound(id))?;
        if !circle.active {
            return Err(CircleError::Inactive(id));
        }
        if !circle.insert_member(member.clone()) {
            return Err(CircleError::AlreadyMember {
                circle: id,
                member: member.to_string(),
            });
        }
        self.memberships.entry(member.clone()).or_default().insert(id);
        self.pending_events
            .push(CircleEvent::MemberAdded { circle: id, member });
        Ok(())
    }

    /// Administratively remove a member.
    pub fn remove_member(
        &mut self,
        caller: &Address,
        id: EntityId,
        member: &Address,
    ) -> Result<(), CircleError> {
        self.require_admin(caller)?;
        let circle = self.circles.get_mut(&id).ok_or(CircleError::NotFound(id))?;
        if !circle.remove_member(member) {
            return Err(CircleError::NotMember {
                circle: id,
                member: member.to_string(),
            });
        }
        if let Some(set) = self.memberships.get_mut(member) {
            set.remove(&id);
        }
        self.pending_events.push(CircleEvent::MemberRemoved {
            circle: id,
            member: member.clone(),
        });
        Ok(())
    }

    /// Self-service join: the caller's current stake must meet the circle's
    /// requirement at the moment of joining. Stake dropping later does not
    /// evict them.
    pub fn join_circle(
        &mut self,
        member: &Address,
        id: EntityId,
        staking: &StakingEngine,
    ) -> Result<(), CircleError> {
        let circle = self.circles.get_mut(&id).ok_or(CircleError::NotFound(id))?;
        if !circle.active {
            return Err(CircleError::Inactive(id));
        }
        let held = staking.stake_of(member);
        if held < circle.required_stake {
            return Err(CircleError::InsufficientStake {
                circle: id,
                required: circle.required_stake,
                held,
            });
        }
        if !circle.insert_member(member.clone()) {
            return Err(CircleError::AlreadyMember {
                circle: id,
                member: member.to_string(),
            });
        }
        self.memberships.entry(member.clone()).or_default().insert(id);
        info!(circle = %id, member = %member, "member joined");
        self.pending_events.push(CircleEvent::MemberAdded {
            circle: id,
            member: member.clone(),
        });
        Ok(())
    }

    /// Self-service leave.
    pub fn leave_circle(&mut self, member: &Address, id: EntityId) -> Result<(), CircleError> {
        let circle = self.circles.get_mut(&id).ok_or(CircleError::NotFound(id))?;
        if !circle.remove_member(member) {
            return Err(CircleError::NotMember {
                circle: id,
                member: member.to_string(),
            });
        }
        if let Some(set) = self.memberships.get_mut(member) {
            set.remove(&id);
        }
        self.pending_events.push(CircleEvent::MemberRemoved {
            circle: id,
            member: member.clone(),
        });
        Ok(())
    }

    // ── Queries ──────────────────────────────────────────────────────────

    pub fn circle(&self, id: EntityId) -> Option<&Circle> {
        self.circles.get(&id)
    }

    pub fn is_member(&self, id: EntityId, who: &Address) -> bool {
        self.circles.get(&id).is_some_and(|c| c.is_member(who))
    }

    pub fn get_members(&self, id: EntityId) -> &[Address] {
        self.circles.get(&id).map(|c| c.members()).unwrap_or(&[])
    }

    /// Whether `who` belongs to any ACTIVE circle whose scopes cover `scope`.
    pub fn has_scope(&self, who: &Address, scope: ProposalScope) -> bool {
        let Some(circle_ids) = self.memberships.get(who) else {
            return false;
        };
        circle_ids.iter().any(|id| {
            self.circles
                .get(id)
                .is_some_and(|c| c.active && c.scopes.contains(scope))
        })
    }

    /// Ids of all circles `who` belongs to.
    pub fn memberships_of(&self, who: &Address) -> Vec<EntityId> {
        self.memberships
            .get(who)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn drain_events(&mut self) -> Vec<CircleEvent> {
        std::mem::take(&mut self.pending_events)
    }

    pub fn snapshot(&self) -> CircleSnapshot {
        CircleSnapshot {
            admin: self.admin.clone(),
            circles: self.circles.clone(),
            memberships: self.memberships.clone(),
        }
    }

    pub fn restore(snapshot: CircleSnapshot) -> Self {
        Self {
            admin: snapshot.admin,
            circles: snapshot.circles,
            memberships: snapshot.memberships,
            pending_events: Vec::new(),
        }
    }
}

/// Serializable snapshot of registry state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CircleSnapshot {
    pub admin: Address,
    pub circles: HashMap<EntityId, Circle>,
    pub memberships: HashMap<Address, HashSet<EntityId>>,
}
