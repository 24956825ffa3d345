// Group lottery: draw teams one at a time and place them into groups
// before fixtures are generated.

use rand::Rng;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::round_robin::{generate_round_robin, shuffle_schedule, Fixture};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LotteryError {
    #[error("{teams} teams cannot be split evenly into {groups} groups")]
    UnevenGroups { teams: usize, groups: usize },
    #[error("at least one group is required")]
    NoGroups,
    #[error("no teams to draw")]
    NoTeams,
    #[error("a drawn team is awaiting assignment")]
    DrawPending,
    #[error("no team has been drawn")]
    NothingDrawn,
    #[error("the pool of undrawn teams is empty")]
    PoolEmpty,
    #[error("group '{0}' is already full")]
    GroupFull(String),
    #[error("unknown group '{0}'")]
    UnknownGroup(String),
    #[error("team '{0}' is not assigned to any group")]
    TeamNotAssigned(String),
    #[error("the draw is not complete")]
    DrawIncomplete,
}

/// One group and its assigned members.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub capacity: usize,
    pub members: Vec<String>,
}

impl Group {
    fn has_slot(&self) -> bool {
        self.members.len() < self.capacity
    }
}

/// The lottery state machine. Teams are drawn uniformly from the pool
/// one at a time; the operator assigns each drawn team to a group.
/// Once exactly one group has free slots the remaining pool is flushed
/// into it automatically. A single-group draw skips the lottery and
/// assigns everyone directly.
#[derive(Debug, Clone)]
pub struct GroupDraw {
    groups: Vec<Group>,
    pool: Vec<String>,
    drawn: Option<String>,
}

fn group_label(index: usize) -> String {
    if index < 26 {
        format!("Group {}", (b'A' + index as u8) as char)
    } else {
        format!("Group {}", index + 1)
    }
}

impl GroupDraw {
    pub fn new(team_names: Vec<String>, num_groups: usize) -> Result<Self, LotteryError> {
        if num_groups == 0 {
            return Err(LotteryError::NoGroups);
        }
        if team_names.is_empty() {
            return Err(LotteryError::NoTeams);
        }
        if team_names.len() % num_groups != 0 {
            return Err(LotteryError::UnevenGroups {
                teams: team_names.len(),
                groups: num_groups,
            });
        }
        let capacity = team_names.len() / num_groups;
        let mut groups: Vec<Group> = (0..num_groups)
            .map(|i| Group { name: group_label(i), capacity, members: Vec::new() })
            .collect();
        // One group means there is nothing to draw for.
        let pool = if num_groups == 1 {
            groups[0].members = team_names;
            Vec::new()
        } else {
            team_names
        };
        Ok(GroupDraw { groups, pool, drawn: None })
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    pub fn pool(&self) -> &[String] {
        &self.pool
    }

    /// The team currently revealed and awaiting assignment.
    pub fn drawn(&self) -> Option<&str> {
        self.drawn.as_deref()
    }

    pub fn is_complete(&self) -> bool {
        self.pool.is_empty() && self.drawn.is_none() && self.groups.iter().all(|g| !g.has_slot())
    }

    /// Reveal the next team: a uniform removal from the undrawn pool.
    pub fn draw_next<R: Rng>(&mut self, rng: &mut R) -> Result<String, LotteryError> {
        if self.drawn.is_some() {
            return Err(LotteryError::DrawPending);
        }
        if self.pool.is_empty() {
            return Err(LotteryError::PoolEmpty);
        }
        let index = rng.gen_range(0..self.pool.len());
        let team = self.pool.swap_remove(index);
        self.drawn = Some(team.clone());
        Ok(team)
    }

    /// Place the drawn team into a group, then flush the rest of the
    /// pool if only one group still has free slots.
    pub fn assign_drawn(&mut self, group_name: &str) -> Result<(), LotteryError> {
        let team = self.drawn.clone().ok_or(LotteryError::NothingDrawn)?;
        let group = self
            .groups
            .iter_mut()
            .find(|g| g.name == group_name)
            .ok_or_else(|| LotteryError::UnknownGroup(group_name.to_string()))?;
        if !group.has_slot() {
            return Err(LotteryError::GroupFull(group.name.clone()));
        }
        group.members.push(team);
        self.drawn = None;
        self.auto_flush();
        Ok(())
    }

    /// Pull a team out of its group and back into the undrawn pool.
    pub fn remove_team(&mut self, team: &str) -> Result<(), LotteryError> {
        for group in &mut self.groups {
            if let Some(pos) = group.members.iter().position(|m| m == team) {
                group.members.remove(pos);
                self.pool.push(team.to_string());
                return Ok(());
            }
        }
        Err(LotteryError::TeamNotAssigned(team.to_string()))
    }

    fn auto_flush(&mut self) {
        if self.pool.is_empty() {
            return;
        }
        let mut open: Vec<usize> = Vec::new();
        for (i, group) in self.groups.iter().enumerate() {
            if group.has_slot() {
                open.push(i);
            }
        }
        if let [only] = open.as_slice() {
            let group = &mut self.groups[*only];
            group.members.append(&mut self.pool);
        }
    }

    /// Generate and shuffle a round-robin schedule per group. Only
    /// valid once every group is full.
    pub fn group_fixtures<R: Rng>(
        &self,
        rng: &mut R,
    ) -> Result<Vec<(String, Vec<Fixture>)>, LotteryError> {
        if !self.is_complete() {
            return Err(LotteryError::DrawIncomplete);
        }
        let mut schedules = Vec::with_capacity(self.groups.len());
        for group in &self.groups {
            let mut fixtures = generate_round_robin(&group.members);
            shuffle_schedule(&mut fixtures, rng);
            schedules.push((group.name.clone(), fixtures));
        }
        Ok(schedules)
    }
}
