mod membership_steps;
mod relay_steps;
