//! Canonical attribute spelling table (§6.3).
//!
//! Embedded verbatim from the upstream producer's known attribute set so
//! that AppFormat snapshots round-trip bit-exact. Matching is
//! case-insensitive; the first match wins; non-matches pass through
//! unchanged (§4.3, §7 "Unknown dict attribute name" — not an error).

const CANONICAL_NAMES: &[&str] = &[
    "ActiveEffects", "BodyFlags", "Caps", "ClearedStatus", "Clip", "CurrAP", "CurrCell", "CurrHP",
    "CurrWeight", "CurrWorldspace", "CurrentHPGain", "Custom", "DateDay", "DateMonth", "DateYear",
    "Description", "Discovered", "Doors", "EffectColor", "Extents", "FavIconType", "HandleID",
    "HeadCondition", "HeadFlags", "Height", "HolotapePlaying", "InvComponents", "Inventory",
    "IsDataUnavailable", "IsInAnimation", "IsInAutoVanity", "IsInVats", "IsInVatsPlayback",
    "IsLoading", "IsMenuOpen", "IsPipboyNotEquipped", "IsPlayerDead", "IsPlayerInDialogue",
    "IsPlayerMovementLocked", "IsPlayerPipboyLocked", "LArmCondition", "LLegCondition",
    "ListVisible", "Local", "LocationFormId", "LocationMarkerFormId", "Locations", "Log", "Map",
    "MaxAP", "MaxHP", "MaxRank", "MaxWeight", "MinigameFormIds", "Modifier", "NEX", "NEY", "NWX",
    "NWY", "Name", "OnDoor", "PaperdollSection", "PerkPoints", "Perks", "Player", "PlayerInfo",
    "PlayerName", "PowerArmor", "QuestId", "Quests", "RArmCondition", "RLegCondition",
    "RadawayCount", "Radio", "Rank", "Rotation", "SWFFile", "SWX", "SWY", "Shared", "SlotResists",
    "SortMode", "Special", "StackID", "Stats", "Status", "StimpakCount", "TimeHour",
    "TorsoCondition", "TotalDamages", "TotalResists", "UnderwearType", "Value", "ValueType",
    "Version", "Visible", "Workshop", "WorkshopHappinessPct", "WorkshopOwned",
    "WorkshopPopulation", "World", "X", "XPLevel", "XPProgressPct", "Y", "canFavorite",
    "damageType", "diffRating", "equipState", "filterFlag", "formID", "inRange", "isLegendary",
    "isPowerArmorItem", "itemCardInfoList", "mapMarkerID", "radawayObjectID",
    "radawayObjectIDIsValid", "scaleWithDuration", "showAsPercent", "showIfZero", "sortedIDS",
    "statArray", "stimpakObjectID", "stimpakObjectIDIsValid", "taggedForSearch", "workshopData",
];

/// Case-fold `name` against the canonical spelling table. Returns the
/// canonical spelling on a case-insensitive match (first match wins),
/// otherwise `name` unchanged.
pub fn normalize(name: &str) -> String {
    for &canonical in CANONICAL_NAMES {
        if canonical.eq_ignore_ascii_case(name) {
            return canonical.to_owned();
        }
    }
    name.to_owned()
}
