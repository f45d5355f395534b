//! Offline replies used when the generative backend is throttling us.

/// Full-body plan returned for any message mentioning a workout.
pub const HOME_WORKOUT_PLAN: &str = "## Home Full-Body Workout Plan

### Warm-up
- Jumping Jacks - 3 minutes
- Arm Circles - 1 minute
- Leg Swings - 1 minute

### Main Workout
1. Push-ups
   - Sets x Reps: 3 x 10-15
   - Rest: 60 seconds

2. Squats
   - Sets x Reps: 3 x 15-20
   - Rest: 60 seconds

3. Plank
   - Sets x Reps: 3 x 30-60 seconds
   - Rest: 60 seconds

4. Lunges
   - Sets x Reps: 3 x 10 each leg
   - Rest: 60 seconds

### Cool-down
- Hamstring Stretch - 30 seconds each leg
- Chest Stretch - 30 seconds

### Notes
- Focus on form over speed for best results";

pub const HINT: &str =
    "I can help with fitness-related questions. Try asking about workouts, nutrition, or specific exercises!";

pub fn canned_reply(input: &str) -> &'static str {
    if input.to_lowercase().contains("workout") {
        HOME_WORKOUT_PLAN
    } else {
        HINT
    }
}
