//! ERC20 contract bindings.

use alloy::sol;

// Minimal ERC20 surface used by the widget: two reads and one write.
sol! {
    #[sol(rpc)]
    interface IERC20 {
        function allowance(address owner, address spender) external view returns (uint256);
        function balanceOf(address account) external view returns (uint256);
        function approve(address spender, uint256 value) external returns (bool);
    }
}
