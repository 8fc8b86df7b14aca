pub struct NewNearbyFlightMessage {}
pub struct ExistingNearbyFlightMessage {}

impl NewNearbyFlightMessage {
    /// Sent to an owner whose flight is near a flight someone else just added.
    pub fn generate(
        new_flight_name: &str,
        creator_name: &str,
        creator_email: &str,
        window_hours: i64,
    ) -> String {
        format!(
            "A new flight \"{}\" was added within {} hours of your flight by {} ({}).",
            new_flight_name, window_hours, creator_name, creator_email,
        )
    }
}

impl ExistingNearbyFlightMessage {
    /// Sent to the creator of a flight, once per existing nearby flight.
    pub fn generate(
        owner_name: &str,
        owner_email: &str,
        owner_flight_name: &str,
        window_hours: i64,
    ) -> String {
        format!(
            "User {} ({}) has a flight \"{}\" within {} hours of your new flight.",
            owner_name, owner_email, owner_flight_name, window_hours,
        )
    }
}
