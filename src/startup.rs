//! Startup template (§6.4, expansion): the nested value the server boots
//! its `Model` from, matching `pipboy.py`'s `Model.__startup` verbatim
//! (empty top-level sections plus `Status`'s explicit defaults).

use serde_json::json;

pub fn template() -> serde_json::Value {
    json!({
        "Inventory": {},
        "Log": [],
        "Map": {},
        "Perks": [],
        "PlayerInfo": {},
        "Quests": [],
        "Radio": [],
        "Special": [],
        "Stats": {},
        "Status": {
            "EffectColor": [0.08, 1.0, 0.09],
            "IsDataUnavailable": true,
            "IsInAnimation": false,
            "IsInAutoVanity": false,
            "IsInVats": false,
            "IsInVatsPlayback": false,
            "IsLoading": false,
            "IsMenuOpen": false,
            "IsPipboyNotEquipped": true,
            "IsPlayerDead": false,
            "IsPlayerInDialogue": false,
            "IsPlayerMovementLocked": false,
            "IsPlayerPipboyLocked": false,
        },
        "Workshop": [],
    })
}
