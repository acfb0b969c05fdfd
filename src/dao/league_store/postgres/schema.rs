diesel::table! {
    players (id) {
        id -> Int4,
        name -> Text,
        email -> Text,
        points -> Int4,
        games_played -> Int4,
        win_rate -> Float8,
        position -> Nullable<Text>,
        bio -> Nullable<Text>,
        avatar_url -> Nullable<Text>,
        is_admin -> Bool,
    }
}

diesel::table! {
    seasons (id) {
        id -> Int4,
        name -> Text,
        start_date -> Date,
        end_date -> Date,
    }
}

diesel::table! {
    sessions (id) {
        id -> Int4,
        session_date -> Date,
        start_time -> Time,
        location -> Text,
        season_id -> Int4,
    }
}

diesel::table! {
    games (id) {
        id -> Int4,
        session_id -> Int4,
        winner_id -> Nullable<Int4>,
    }
}

diesel::table! {
    teams (id) {
        id -> Int4,
        name -> Text,
        session_id -> Nullable<Int4>,
        game_id -> Nullable<Int4>,
    }
}

diesel::table! {
    player_sessions (player_id, session_id) {
        player_id -> Int4,
        session_id -> Int4,
    }
}

diesel::table! {
    player_teams (player_id, team_id) {
        player_id -> Int4,
        team_id -> Int4,
    }
}

diesel::table! {
    invite_codes (id) {
        id -> Int4,
        code -> Text,
        is_used -> Bool,
        season_id -> Nullable<Int4>,
    }
}

diesel::joinable!(sessions -> seasons (season_id));
diesel::joinable!(games -> sessions (session_id));
diesel::joinable!(teams -> games (game_id));
diesel::joinable!(player_sessions -> players (player_id));
diesel::joinable!(player_sessions -> sessions (session_id));
diesel::joinable!(player_teams -> players (player_id));
diesel::joinable!(player_teams -> teams (team_id));

diesel::allow_tables_to_appear_in_same_query!(
    players,
    seasons,
    sessions,
    games,
    teams,
    player_sessions,
    player_teams,
    invite_codes,
);
