//! Trajectory manager contract.

/// Robot-level motion command interface.
///
/// Implementations are shared between the thread issuing commands and the
/// position control loop updating progress, so every method takes `&self`
/// and implementations synchronize internally.
///
/// Speeds and accelerations passed to [`set_speed`](Self::set_speed) and
/// [`set_acceleration`](Self::set_acceleration) are in encoder impulses; use
/// the conversion helpers to get there from SI units.
///
/// # Timing
/// Command methods only queue the request and must return promptly; none of
/// them waits for motion to complete.
pub trait TrajectoryManager: Send + Sync {
    /// Whether the last accepted command has completed.
    fn is_finished(&self) -> bool;

    /// Move straight by `distance_mm` (negative is backwards).
    fn command_relative_distance(&self, distance_mm: f32);

    /// Turn to the absolute heading `angle_deg`.
    fn command_absolute_angle(&self, angle_deg: f32);

    /// Drive to the absolute table position (`x_mm`, `y_mm`).
    fn goto_absolute_xy(&self, x_mm: f32, y_mm: f32);

    /// Stop immediately, dropping the current command.
    fn hard_stop(&self);

    /// Cruise speed limits, impulses per control period.
    fn set_speed(&self, distance_speed: f64, angle_speed: f64);

    /// Acceleration limits, impulses per control period squared.
    fn set_acceleration(&self, distance_acc: f64, angle_acc: f64);

    /// Convert a linear speed [mm/s] to impulses.
    fn speed_mm_to_imp(&self, speed_mm_s: f64) -> f64;

    /// Convert an angular speed [rad/s] to impulses.
    fn speed_rad_to_imp(&self, speed_rad_s: f64) -> f64;

    /// Convert a linear acceleration [mm/s²] to impulses.
    fn acc_mm_to_imp(&self, acc_mm_s2: f64) -> f64;

    /// Convert an angular acceleration [rad/s²] to impulses.
    fn acc_rad_to_imp(&self, acc_rad_s2: f64) -> f64;
}
