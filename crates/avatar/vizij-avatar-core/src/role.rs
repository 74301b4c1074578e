//! Semantic humanoid roles and a fixed-size table keyed by them.
//!
//! Roles are resolved once at bind time against whatever joint names the
//! loaded rig provides. Every role has a canonical VRM humanoid name plus a
//! handful of aliases for the other naming schemes seen in the wild.

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Head,
    Neck,
    Spine,
    Chest,
    LeftShoulder,
    RightShoulder,
    LeftUpperArm,
    RightUpperArm,
    LeftLowerArm,
    RightLowerArm,
    LeftHand,
    RightHand,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Side {
    Left,
    Right,
}

impl Role {
    pub const COUNT: usize = 12;

    pub const ALL: [Role; Role::COUNT] = [
        Role::Head,
        Role::Neck,
        Role::Spine,
        Role::Chest,
        Role::LeftShoulder,
        Role::RightShoulder,
        Role::LeftUpperArm,
        Role::RightUpperArm,
        Role::LeftLowerArm,
        Role::RightLowerArm,
        Role::LeftHand,
        Role::RightHand,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// VRM humanoid bone name.
    pub fn canonical_name(self) -> &'static str {
        match self {
            Role::Head => "head",
            Role::Neck => "neck",
            Role::Spine => "spine",
            Role::Chest => "chest",
            Role::LeftShoulder => "leftShoulder",
            Role::RightShoulder => "rightShoulder",
            Role::LeftUpperArm => "leftUpperArm",
            Role::RightUpperArm => "rightUpperArm",
            Role::LeftLowerArm => "leftLowerArm",
            Role::RightLowerArm => "rightLowerArm",
            Role::LeftHand => "leftHand",
            Role::RightHand => "rightHand",
        }
    }

    /// Alternative joint names tried after the canonical name (VRoid raw
    /// bone names, Mixamo, Blender rigify-style suffixes).
    pub fn aliases(self) -> &'static [&'static str] {
        match self {
            Role::Head => &["J_Bip_C_Head", "mixamorig:Head"],
            Role::Neck => &["J_Bip_C_Neck", "mixamorig:Neck"],
            Role::Spine => &["J_Bip_C_Spine", "mixamorig:Spine"],
            Role::Chest => &["J_Bip_C_Chest", "mixamorig:Spine1", "upperChest"],
            Role::LeftShoulder => &["J_Bip_L_Shoulder", "mixamorig:LeftShoulder", "shoulder.L"],
            Role::RightShoulder => &["J_Bip_R_Shoulder", "mixamorig:RightShoulder", "shoulder.R"],
            Role::LeftUpperArm => &["J_Bip_L_UpperArm", "mixamorig:LeftArm", "upper_arm.L"],
            Role::RightUpperArm => &["J_Bip_R_UpperArm", "mixamorig:RightArm", "upper_arm.R"],
            Role::LeftLowerArm => &["J_Bip_L_LowerArm", "mixamorig:LeftForeArm", "forearm.L"],
            Role::RightLowerArm => &["J_Bip_R_LowerArm", "mixamorig:RightForeArm", "forearm.R"],
            Role::LeftHand => &["J_Bip_L_Hand", "mixamorig:LeftHand", "hand.L"],
            Role::RightHand => &["J_Bip_R_Hand", "mixamorig:RightHand", "hand.R"],
        }
    }

    /// Look up a role by its canonical name (case-insensitive).
    pub fn from_canonical(name: &str) -> Option<Role> {
        Role::ALL
            .iter()
            .copied()
            .find(|r| r.canonical_name().eq_ignore_ascii_case(name))
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Role::LeftShoulder | Role::LeftUpperArm | Role::LeftLowerArm | Role::LeftHand => {
                Some(Side::Left)
            }
            Role::RightShoulder | Role::RightUpperArm | Role::RightLowerArm | Role::RightHand => {
                Some(Side::Right)
            }
            _ => None,
        }
    }

    #[inline]
    pub fn is_hand(self) -> bool {
        matches!(self, Role::LeftHand | Role::RightHand)
    }

    #[inline]
    pub fn is_upper_arm(self) -> bool {
        matches!(self, Role::LeftUpperArm | Role::RightUpperArm)
    }

    #[inline]
    pub fn is_lower_arm(self) -> bool {
        matches!(self, Role::LeftLowerArm | Role::RightLowerArm)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.canonical_name())
    }
}

/// Dense table with one slot per [`Role`], indexed by `Role::index()`.
#[derive(Clone, Debug, PartialEq)]
pub struct RoleTable<T> {
    slots: [T; Role::COUNT],
}

impl<T> RoleTable<T> {
    pub fn from_fn(mut f: impl FnMut(Role) -> T) -> Self {
        Self {
            slots: std::array::from_fn(|i| f(Role::ALL[i])),
        }
    }

    #[inline]
    pub fn get(&self, role: Role) -> &T {
        &self.slots[role.index()]
    }

    #[inline]
    pub fn get_mut(&mut self, role: Role) -> &mut T {
        &mut self.slots[role.index()]
    }

    #[inline]
    pub fn set(&mut self, role: Role, value: T) {
        self.slots[role.index()] = value;
    }

    pub fn iter(&self) -> impl Iterator<Item = (Role, &T)> {
        Role::ALL.iter().copied().zip(self.slots.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (Role, &mut T)> {
        Role::ALL.iter().copied().zip(self.slots.iter_mut())
    }
}

impl<T: Default> Default for RoleTable<T> {
    fn default() -> Self {
        Self::from_fn(|_| T::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_roles_index_densely() {
        for (i, role) in Role::ALL.iter().enumerate() {
            assert_eq!(role.index(), i);
        }
    }

    #[test]
    fn canonical_lookup_ignores_case() {
        assert_eq!(Role::from_canonical("LeftUpperArm"), Some(Role::LeftUpperArm));
        assert_eq!(Role::from_canonical("HEAD"), Some(Role::Head));
        assert_eq!(Role::from_canonical("hips"), None);
    }

    #[test]
    fn sides_pair_up() {
        assert_eq!(Role::LeftHand.side(), Some(Side::Left));
        assert_eq!(Role::RightShoulder.side(), Some(Side::Right));
        assert_eq!(Role::Spine.side(), None);
    }

    #[test]
    fn role_table_roundtrip() {
        let mut t: RoleTable<Option<u32>> = RoleTable::default();
        t.set(Role::Neck, Some(3));
        assert_eq!(*t.get(Role::Neck), Some(3));
        assert_eq!(t.iter().filter(|(_, v)| v.is_some()).count(), 1);
    }

    #[test]
    fn serde_names_are_camel_case() {
        let s = serde_json::to_string(&Role::LeftUpperArm).unwrap();
        assert_eq!(s, "\"leftUpperArm\"");
    }
}
